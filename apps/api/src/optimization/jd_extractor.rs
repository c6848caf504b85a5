//! JD extraction stage: pulls target role facts and keywords out of a job description.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{generate_json, TextGenerator};
use crate::models::job::JobFacts;
use crate::optimization::prompts::{JD_EXTRACT_PROMPT_TEMPLATE, JD_EXTRACT_SYSTEM};
use crate::optimization::stages::StageError;
use crate::text::dedup_case_insensitive;

const SENIORITY_LEVELS: &[&str] = &[
    "junior",
    "mid",
    "senior",
    "staff",
    "principal",
    "director",
];

pub async fn extract_job_facts(
    job_description: &str,
    llm: &dyn TextGenerator,
) -> Result<JobFacts, StageError> {
    let prompt = JD_EXTRACT_PROMPT_TEMPLATE
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{jd_text}", job_description);

    let facts: JobFacts = generate_json(llm, &prompt, JD_EXTRACT_SYSTEM).await?;
    Ok(normalize(facts))
}

/// Trims every field, de-duplicates keywords and requirements, and maps an
/// unrecognised seniority to "unknown". An empty keyword list is valid.
fn normalize(facts: JobFacts) -> JobFacts {
    let seniority = facts.seniority.trim().to_lowercase();
    JobFacts {
        target_title: facts.target_title.trim().to_string(),
        target_company: facts.target_company.trim().to_string(),
        seniority: if SENIORITY_LEVELS.contains(&seniority.as_str()) {
            seniority
        } else {
            "unknown".to_string()
        },
        keywords: dedup_case_insensitive(facts.keywords),
        requirements: dedup_case_insensitive(facts.requirements),
    }
}
