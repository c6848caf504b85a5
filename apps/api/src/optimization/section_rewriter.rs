//! Summary and skills rewrite stages. Both are best-effort; the orchestrator keeps
//! the pre-rewrite value when either fails.

use serde::Deserialize;

use crate::llm_client::prompts::{FACTUALITY_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{generate_json, TextGenerator};
use crate::models::job::JobFacts;
use crate::models::resume::ResumeDocument;
use crate::optimization::prompts::{
    SKILLS_REWRITE_PROMPT_TEMPLATE, SKILLS_REWRITE_SYSTEM, SUMMARY_REWRITE_PROMPT_TEMPLATE,
    SUMMARY_REWRITE_SYSTEM,
};
use crate::optimization::stages::StageError;
use crate::text::dedup_case_insensitive;

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct SkillsResponse {
    #[serde(default)]
    skills: Vec<String>,
}

fn json_list(items: &[String]) -> Result<String, StageError> {
    serde_json::to_string(items).map_err(|e| StageError::Malformed(e.to_string()))
}

/// `resume` must already carry the rewritten bullets; they ground the summary.
pub async fn rewrite_summary(
    llm: &dyn TextGenerator,
    job: &JobFacts,
    resume: &ResumeDocument,
) -> Result<String, StageError> {
    let bullets: Vec<String> = resume.bullets().map(|(_, _, b)| b.to_string()).collect();

    let prompt = SUMMARY_REWRITE_PROMPT_TEMPLATE
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{factuality_instruction}", FACTUALITY_INSTRUCTION)
        .replace("{target_title}", &job.target_title)
        .replace("{target_company}", &job.target_company)
        .replace("{keywords_json}", &json_list(&job.keywords)?)
        .replace("{bullets_json}", &json_list(&bullets)?)
        .replace("{summary}", &resume.summary);

    let response: SummaryResponse = generate_json(llm, &prompt, SUMMARY_REWRITE_SYSTEM).await?;
    let summary = response.summary.trim();
    if summary.is_empty() {
        return Err(StageError::Malformed("empty summary".to_string()));
    }
    Ok(summary.to_string())
}

/// `summary` is the already-optimized summary; the skills prompt depends on it.
pub async fn rewrite_skills(
    llm: &dyn TextGenerator,
    job: &JobFacts,
    skills: &[String],
    summary: &str,
) -> Result<Vec<String>, StageError> {
    let prompt = SKILLS_REWRITE_PROMPT_TEMPLATE
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{factuality_instruction}", FACTUALITY_INSTRUCTION)
        .replace("{keywords_json}", &json_list(&job.keywords)?)
        .replace("{skills_json}", &json_list(skills)?)
        .replace("{summary}", summary);

    let response: SkillsResponse = generate_json(llm, &prompt, SKILLS_REWRITE_SYSTEM).await?;
    let skills = dedup_case_insensitive(response.skills);
    if skills.is_empty() {
        return Err(StageError::Malformed("empty skills list".to_string()));
    }
    Ok(skills)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock::ScriptedGenerator;

    #[tokio::test]
    async fn test_skills_prompt_includes_optimized_summary() {
        let llm = ScriptedGenerator::new().reply_to(
            SKILLS_REWRITE_SYSTEM,
            r#"{"skills": ["Python", "python", "Kubernetes"]}"#,
        );
        let skills = rewrite_skills(
            &llm,
            &JobFacts::default(),
            &["Python".to_string()],
            "Optimized summary text",
        )
        .await
        .unwrap();
        assert_eq!(skills, vec!["Python", "Kubernetes"]);
        assert!(llm.calls()[0].prompt.contains("Optimized summary text"));
    }

    #[tokio::test]
    async fn test_empty_summary_is_malformed() {
        let llm = ScriptedGenerator::new().reply_to(SUMMARY_REWRITE_SYSTEM, r#"{"summary": ""}"#);
        let err = rewrite_summary(&llm, &JobFacts::default(), &ResumeDocument::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_summary_is_trimmed() {
        let llm = ScriptedGenerator::new()
            .reply_to(SUMMARY_REWRITE_SYSTEM, r#"{"summary": "  Backend engineer.  "}"#);
        let summary = rewrite_summary(&llm, &JobFacts::default(), &ResumeDocument::default())
            .await
            .unwrap();
        assert_eq!(summary, "Backend engineer.");
    }
}
