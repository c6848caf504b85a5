// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Appended to every system prompt that expects a JSON reply.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Shared guard against fabricated résumé content.
pub const FACTUALITY_INSTRUCTION: &str = "\
    CRITICAL: Never invent employers, titles, dates, credentials, or metrics. \
    You may rephrase and emphasise what the candidate wrote, but every fact in your \
    output must already be present in the candidate's material.";

/// Shared instruction for 0–100 scoring calls.
pub const SCORE_RANGE_INSTRUCTION: &str = "\
    Scores are integers from 0 (no match at all) to 100 (perfect match). \
    Score each résumé independently against the job description.";
