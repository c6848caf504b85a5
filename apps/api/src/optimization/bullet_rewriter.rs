//! Bullet rewrite stage: one call per bullet, folded over a `UsedVerbs` accumulator.
//!
//! The accumulator goes in by value and comes back extended with the opening
//! token of the rewrite, whether or not the generator honoured the avoid list.
//! A bullet that reuses a verb is never re-requested.

use serde::Deserialize;

use crate::llm_client::prompts::{FACTUALITY_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{generate_json, TextGenerator};
use crate::models::job::JobFacts;
use crate::models::run::BulletRewriteResult;
use crate::optimization::prompts::{BULLET_REWRITE_PROMPT_TEMPLATE, BULLET_REWRITE_SYSTEM};
use crate::optimization::stages::StageError;
use crate::text::{contains_ci, first_token};

/// Opening tokens of every bullet rewritten so far in this run, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedVerbs(Vec<String>);

impl UsedVerbs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the first whitespace-delimited token of `bullet`, if any.
    #[must_use]
    pub fn record(mut self, bullet: &str) -> Self {
        if let Some(token) = first_token(bullet) {
            self.0.push(token.to_string());
        }
        self
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// One bullet to rewrite, with the keywords routed to it.
#[derive(Debug, Clone, Copy)]
pub struct BulletTarget<'a> {
    pub work_index: usize,
    pub bullet_index: usize,
    pub text: &'a str,
    pub assigned_keywords: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulletRewriteResponse {
    #[serde(default)]
    rewritten_bullet: String,
}

pub async fn rewrite_bullet(
    llm: &dyn TextGenerator,
    job: &JobFacts,
    target: BulletTarget<'_>,
    used: UsedVerbs,
) -> Result<(BulletRewriteResult, UsedVerbs), StageError> {
    let keywords_json = serde_json::to_string(target.assigned_keywords)
        .map_err(|e| StageError::Malformed(e.to_string()))?;
    let used_verbs_json = serde_json::to_string(used.as_slice())
        .map_err(|e| StageError::Malformed(e.to_string()))?;

    let prompt = BULLET_REWRITE_PROMPT_TEMPLATE
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{factuality_instruction}", FACTUALITY_INSTRUCTION)
        .replace("{target_title}", &job.target_title)
        .replace("{keywords_json}", &keywords_json)
        .replace("{used_verbs_json}", &used_verbs_json)
        .replace("{bullet}", target.text);

    let response: BulletRewriteResponse =
        generate_json(llm, &prompt, BULLET_REWRITE_SYSTEM).await?;
    let rewritten = response.rewritten_bullet.trim().to_string();
    if rewritten.is_empty() {
        return Err(StageError::Malformed(format!(
            "empty rewrite for bullet ({}, {})",
            target.work_index, target.bullet_index
        )));
    }

    let used = used.record(&rewritten);
    let result = BulletRewriteResult {
        work_index: target.work_index,
        bullet_index: target.bullet_index,
        original_bullet: target.text.to_string(),
        keywords_used: keywords_used(&rewritten, target.assigned_keywords),
        rewritten_bullet: rewritten,
    };
    Ok((result, used))
}

/// The assigned keywords that actually appear in the rewritten text.
pub fn keywords_used(rewritten: &str, assigned: &[String]) -> Vec<String> {
    assigned
        .iter()
        .filter(|k| contains_ci(rewritten, k))
        .cloned()
        .collect()
}
