// LLM prompt constants for the Scorecard module.
// Every template asks for the same reply shape: {"originalScore": n, "optimizedScore": n}.

/// System prompt for scoring a metric whose heuristic found no signal.
pub const METRIC_FALLBACK_SYSTEM: &str = "You are an applicant-tracking-system evaluator. \
    Score two versions of a résumé against one job description on a single named dimension.";

/// System prompt for the always-on role alignment comparison.
pub const ROLE_ALIGNMENT_SYSTEM: &str = "You are a senior technical recruiter. \
    Judge how closely a candidate's titles, responsibilities and scope match a target role.";

/// System prompt for refining the seniority heuristic.
pub const SENIORITY_ALIGNMENT_SYSTEM: &str = "You are a senior technical recruiter. \
    Judge whether a candidate's demonstrated seniority matches the level a job asks for.";

/// Shared pair-scoring prompt. Replace `{json_instruction}`, `{score_range_instruction}`,
/// `{dimension}`, `{job_description}`, `{requirements}`, `{original_resume}`, `{optimized_resume}`.
pub const PAIR_SCORE_PROMPT_TEMPLATE: &str = r#"{json_instruction}
{score_range_instruction}

DIMENSION: {dimension}

Return a JSON object with this EXACT schema:
{"originalScore": 0, "optimizedScore": 0}

JOB DESCRIPTION:
{job_description}

KEY REQUIREMENTS:
{requirements}

ORIGINAL RÉSUMÉ:
{original_resume}

OPTIMIZED RÉSUMÉ:
{optimized_resume}"#;

pub const ROLE_ALIGNMENT_DIMENSION: &str =
    "Role Alignment: how well the candidate's job titles, responsibilities and scope \
    of ownership match the target role.";

pub const SENIORITY_ALIGNMENT_DIMENSION: &str =
    "Experience Alignment: how well the candidate's years of experience and seniority \
    of past roles match the seniority the job asks for.";
