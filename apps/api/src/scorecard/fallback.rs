//! Generative scoring: the fallback adapter for degenerate heuristics plus the
//! two LLM-scored dimensions.
//!
//! Replies are untrusted: missing or non-numeric fields coerce to 0 and every
//! number is clamped to 0..=100 instead of failing the metric.
//!
//! The fallback fires when either side scores 0. A heuristic that legitimately
//! found zero overlap is indistinguishable from one that extracted no signal, so
//! both go to the generator.

use serde_json::Value;
use tracing::warn;

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, SCORE_RANGE_INSTRUCTION};
use crate::llm_client::{generate_json, LlmError, TextGenerator};
use crate::models::scorecard::{MetricName, ScoreSource};
use crate::scorecard::metrics::to_score;
use crate::scorecard::prompts::{
    METRIC_FALLBACK_SYSTEM, PAIR_SCORE_PROMPT_TEMPLATE, ROLE_ALIGNMENT_DIMENSION,
    ROLE_ALIGNMENT_SYSTEM, SENIORITY_ALIGNMENT_DIMENSION, SENIORITY_ALIGNMENT_SYSTEM,
};

/// `(original, optimized)` score pair.
pub type ScorePair = (u32, u32);

/// The texts every generative scoring call compares.
pub struct ScoringInput<'a> {
    pub job_description: &'a str,
    /// Requirements extracted from the job description.
    pub requirements: &'a [String],
    pub original_text: &'a str,
    pub optimized_text: &'a str,
}

/// Coerces one reply field to a score. Numbers and numeric strings are rounded
/// and clamped; anything else is 0.
pub fn parse_score(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n.as_f64().map(to_score).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(to_score).unwrap_or(0),
        _ => 0,
    }
}

fn parse_pair(reply: &Value) -> ScorePair {
    (
        parse_score(reply.get("originalScore")),
        parse_score(reply.get("optimizedScore")),
    )
}

fn requirement_list(requirements: &[String]) -> String {
    if requirements.is_empty() {
        return "(none listed)".to_string();
    }
    requirements
        .iter()
        .map(|r| format!("- {r}"))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn request_pair(
    llm: &dyn TextGenerator,
    system: &str,
    dimension: &str,
    input: &ScoringInput<'_>,
) -> Result<ScorePair, LlmError> {
    let prompt = PAIR_SCORE_PROMPT_TEMPLATE
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{score_range_instruction}", SCORE_RANGE_INSTRUCTION)
        .replace("{dimension}", dimension)
        .replace("{job_description}", input.job_description)
        .replace("{requirements}", &requirement_list(input.requirements))
        .replace("{original_resume}", input.original_text)
        .replace("{optimized_resume}", input.optimized_text);

    let reply: Value = generate_json(llm, &prompt, system).await?;
    Ok(parse_pair(&reply))
}

/// Substitutes a generator score for both sides when either heuristic side is 0.
/// A failed call keeps the heuristic pair.
pub async fn fallback_if_degenerate(
    llm: &dyn TextGenerator,
    metric: MetricName,
    heuristic: ScorePair,
    input: &ScoringInput<'_>,
) -> (ScorePair, ScoreSource) {
    if heuristic.0 != 0 && heuristic.1 != 0 {
        return (heuristic, ScoreSource::Heuristic);
    }
    match request_pair(llm, METRIC_FALLBACK_SYSTEM, metric.label(), input).await {
        Ok(pair) => (pair, ScoreSource::LlmFallback),
        Err(e) => {
            warn!("{} fallback scoring failed, keeping heuristic: {e}", metric.label());
            (heuristic, ScoreSource::Heuristic)
        }
    }
}

/// Role Alignment has no heuristic. A failed call scores both sides 0.
pub async fn role_alignment(
    llm: &dyn TextGenerator,
    input: &ScoringInput<'_>,
) -> (ScorePair, ScoreSource) {
    match request_pair(llm, ROLE_ALIGNMENT_SYSTEM, ROLE_ALIGNMENT_DIMENSION, input).await {
        Ok(pair) => (pair, ScoreSource::Llm),
        Err(e) => {
            warn!("Role Alignment scoring failed, defaulting to 0: {e}");
            ((0, 0), ScoreSource::Llm)
        }
    }
}

/// Averages each heuristic side with the generator's seniority judgement. A
/// failed call keeps the heuristic pair.
pub async fn refine_experience(
    llm: &dyn TextGenerator,
    heuristic: ScorePair,
    input: &ScoringInput<'_>,
) -> (ScorePair, ScoreSource) {
    match request_pair(
        llm,
        SENIORITY_ALIGNMENT_SYSTEM,
        SENIORITY_ALIGNMENT_DIMENSION,
        input,
    )
    .await
    {
        Ok(llm_pair) => (
            (
                blend(heuristic.0, llm_pair.0),
                blend(heuristic.1, llm_pair.1),
            ),
            ScoreSource::Blended,
        ),
        Err(e) => {
            warn!("Experience Alignment refinement failed, keeping heuristic: {e}");
            (heuristic, ScoreSource::Heuristic)
        }
    }
}

fn blend(heuristic: u32, generated: u32) -> u32 {
    to_score((f64::from(heuristic) + f64::from(generated)) / 2.0)
}
