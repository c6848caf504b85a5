//! Keyword mapping stage: routes job keywords onto the bullets that can carry them.
//!
//! The generator is asked to respect the per-keyword cap; `validate_assignments`
//! enforces it on the reply so no run ever persists more than
//! `MAX_BULLETS_PER_KEYWORD` bullets for one keyword.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{generate_json, TextGenerator};
use crate::models::resume::ResumeDocument;
use crate::models::run::KeywordAssignment;
use crate::optimization::prompts::{KEYWORD_MAP_PROMPT_TEMPLATE, KEYWORD_MAP_SYSTEM};
use crate::optimization::stages::StageError;

pub const MAX_BULLETS_PER_KEYWORD: usize = 3;

#[derive(Debug, Deserialize)]
struct KeywordMapResponse {
    #[serde(default)]
    assignments: Vec<KeywordAssignment>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BulletRef<'a> {
    work_index: usize,
    bullet_index: usize,
    text: &'a str,
}

pub async fn map_keywords(
    keywords: &[String],
    resume: &ResumeDocument,
    llm: &dyn TextGenerator,
) -> Result<Vec<KeywordAssignment>, StageError> {
    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let bullets: Vec<BulletRef> = resume
        .bullets()
        .map(|(work_index, bullet_index, text)| BulletRef {
            work_index,
            bullet_index,
            text,
        })
        .collect();

    let prompt = KEYWORD_MAP_PROMPT_TEMPLATE
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{max_per_keyword}", &MAX_BULLETS_PER_KEYWORD.to_string())
        .replace("{keywords_json}", &to_json(keywords)?)
        .replace("{bullets_json}", &to_json(&bullets)?);

    let response: KeywordMapResponse = generate_json(llm, &prompt, KEYWORD_MAP_SYSTEM).await?;
    Ok(validate_assignments(response.assignments, keywords, resume))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StageError> {
    serde_json::to_string(value).map_err(|e| StageError::Malformed(e.to_string()))
}

/// Drops out-of-range pairs and unknown keywords, merges duplicate pairs,
/// applies the per-keyword cap in document order, and removes assignments
/// left empty. Keywords are normalised to the job's spelling.
pub fn validate_assignments(
    raw: Vec<KeywordAssignment>,
    keywords: &[String],
    resume: &ResumeDocument,
) -> Vec<KeywordAssignment> {
    let canonical: HashMap<String, &String> =
        keywords.iter().map(|k| (k.to_lowercase(), k)).collect();

    // BTreeMap orders pairs by (work_index, bullet_index), i.e. document order.
    let mut merged: BTreeMap<(usize, usize), Vec<String>> = BTreeMap::new();
    for assignment in raw {
        let in_bounds = resume
            .work
            .get(assignment.work_index)
            .is_some_and(|w| assignment.bullet_index < w.bullets.len());
        if !in_bounds {
            warn!(
                "Dropping keyword assignment for out-of-range bullet ({}, {})",
                assignment.work_index, assignment.bullet_index
            );
            continue;
        }

        let slot = merged
            .entry((assignment.work_index, assignment.bullet_index))
            .or_default();
        for keyword in assignment.assigned_keywords {
            let Some(&known) = canonical.get(&keyword.trim().to_lowercase()) else {
                continue;
            };
            if !slot.contains(known) {
                slot.push(known.clone());
            }
        }
    }

    let mut uses: HashMap<String, usize> = HashMap::new();
    merged
        .into_iter()
        .filter_map(|((work_index, bullet_index), candidates)| {
            let assigned_keywords: Vec<String> = candidates
                .into_iter()
                .filter(|k| {
                    let count = uses.entry(k.clone()).or_insert(0);
                    if *count >= MAX_BULLETS_PER_KEYWORD {
                        return false;
                    }
                    *count += 1;
                    true
                })
                .collect();
            (!assigned_keywords.is_empty()).then_some(KeywordAssignment {
                work_index,
                bullet_index,
                assigned_keywords,
            })
        })
        .collect()
}

/// Assigned keywords for one bullet, or an empty slice when it received none.
pub fn keywords_for(
    assignments: &[KeywordAssignment],
    work_index: usize,
    bullet_index: usize,
) -> &[String] {
    assignments
        .iter()
        .find(|a| a.work_index == work_index && a.bullet_index == bullet_index)
        .map(|a| a.assigned_keywords.as_slice())
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock::ScriptedGenerator;
    use crate::models::resume::WorkExperience;

    fn resume(bullets_per_entry: &[usize]) -> ResumeDocument {
        ResumeDocument {
            work: bullets_per_entry
                .iter()
                .map(|&n| WorkExperience {
                    bullets: (0..n).map(|i| format!("bullet {i}")).collect(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn assign(w: usize, b: usize, kws: &[&str]) -> KeywordAssignment {
        KeywordAssignment {
            work_index: w,
            bullet_index: b,
            assigned_keywords: kws.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_cap_keeps_first_three_bullets_in_document_order() {
        let keywords = vec!["Rust".to_string()];
        let raw = vec![
            assign(1, 1, &["Rust"]),
            assign(0, 0, &["Rust"]),
            assign(1, 0, &["Rust"]),
            assign(0, 1, &["Rust"]),
        ];
        let out = validate_assignments(raw, &keywords, &resume(&[2, 2]));
        let pairs: Vec<_> = out.iter().map(|a| (a.work_index, a.bullet_index)).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_out_of_range_and_unknown_keywords_are_dropped() {
        let keywords = vec!["Kubernetes".to_string()];
        let raw = vec![
            assign(0, 5, &["Kubernetes"]),
            assign(3, 0, &["Kubernetes"]),
            assign(0, 0, &["COBOL"]),
            assign(0, 1, &["kubernetes"]),
        ];
        let out = validate_assignments(raw, &keywords, &resume(&[2]));
        assert_eq!(out, vec![assign(0, 1, &["Kubernetes"])]);
    }

    #[test]
    fn test_duplicate_pairs_merge() {
        let keywords = vec!["Go".to_string(), "gRPC".to_string()];
        let raw = vec![assign(0, 0, &["Go"]), assign(0, 0, &["gRPC", "Go"])];
        let out = validate_assignments(raw, &keywords, &resume(&[1]));
        assert_eq!(out, vec![assign(0, 0, &["Go", "gRPC"])]);
    }

    #[test]
    fn test_keywords_for_missing_bullet_is_empty() {
        let assignments = vec![assign(0, 1, &["Go"])];
        assert_eq!(keywords_for(&assignments, 0, 1), ["Go".to_string()]);
        assert!(keywords_for(&assignments, 0, 0).is_empty());
    }

    #[tokio::test]
    async fn test_no_keywords_skips_the_call() {
        let llm = ScriptedGenerator::new();
        let out = map_keywords(&[], &resume(&[2]), &llm).await.unwrap();
        assert!(out.is_empty());
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generator_over_assignment_is_capped() {
        let llm = ScriptedGenerator::new().reply_to(
            KEYWORD_MAP_SYSTEM,
            r#"{"assignments": [
                {"workIndex": 0, "bulletIndex": 0, "assignedKeywords": ["Python"]},
                {"workIndex": 0, "bulletIndex": 1, "assignedKeywords": ["Python"]},
                {"workIndex": 0, "bulletIndex": 2, "assignedKeywords": ["Python"]},
                {"workIndex": 0, "bulletIndex": 3, "assignedKeywords": ["Python"]}
            ]}"#,
        );
        let out = map_keywords(&["Python".to_string()], &resume(&[4]), &llm)
            .await
            .unwrap();
        assert_eq!(out.len(), MAX_BULLETS_PER_KEYWORD);
    }
}
