//! Stage descriptors: the fixed pipeline order and each stage's criticality.
//!
//! The orchestrator consults `Stage::criticality()` in one place (`settle`)
//! instead of special-casing failures per stage.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::llm_client::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Authenticating,
    ExtractingJdInfo,
    ParsingResume,
    MappingKeywords,
    RewritingBullet,
    RewritingSummary,
    RewritingSkills,
    Persist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    /// Failure aborts the run.
    Required,
    /// Failure is logged and the pre-stage value is kept.
    BestEffort,
}

impl Stage {
    /// Execution order. `RewritingBullet` repeats once per bullet.
    #[cfg(test)]
    pub const ORDER: [Stage; 8] = [
        Stage::Authenticating,
        Stage::ExtractingJdInfo,
        Stage::ParsingResume,
        Stage::MappingKeywords,
        Stage::RewritingBullet,
        Stage::RewritingSummary,
        Stage::RewritingSkills,
        Stage::Persist,
    ];

    pub fn step(&self) -> &'static str {
        match self {
            Stage::Authenticating => "authenticating",
            Stage::ExtractingJdInfo => "extracting_jd_info",
            Stage::ParsingResume => "parsing_resume",
            Stage::MappingKeywords => "mapping_keywords",
            Stage::RewritingBullet => "rewriting_bullet",
            Stage::RewritingSummary => "rewriting_summary",
            Stage::RewritingSkills => "rewriting_skills",
            Stage::Persist => "persist",
        }
    }

    pub fn criticality(&self) -> Criticality {
        match self {
            Stage::RewritingSummary | Stage::RewritingSkills => Criticality::BestEffort,
            _ => Criticality::Required,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.step())
    }
}

/// Why a single stage failed.
#[derive(Debug, Error)]
pub enum StageError {
    /// Transport failure or non-success status from the generation service.
    #[error("generation service error: {0}")]
    Upstream(LlmError),

    /// The stage answered but its output failed JSON or shape validation.
    #[error("malformed stage output: {0}")]
    Malformed(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<LlmError> for StageError {
    fn from(e: LlmError) -> Self {
        if e.is_malformed_output() {
            StageError::Malformed(e.to_string())
        } else {
            StageError::Upstream(e)
        }
    }
}

/// A fatal stage failure. Its `Display` is the terminal error frame's message.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

/// Applies `stage`'s criticality to its outcome. Best-effort stages fall back to
/// `pre_stage` when one is supplied; everything else becomes a `PipelineError`.
pub fn settle<T>(
    stage: Stage,
    outcome: Result<T, StageError>,
    pre_stage: Option<T>,
) -> Result<T, PipelineError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(source) => match (stage.criticality(), pre_stage) {
            (Criticality::BestEffort, Some(fallback)) => {
                warn!("Stage {stage} failed, keeping pre-stage value: {source}");
                Ok(fallback)
            }
            _ => Err(PipelineError { stage, source }),
        },
    }
}
