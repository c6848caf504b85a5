use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job::JobFacts;
use crate::models::resume::ResumeDocument;

/// Job keywords routed to one work bullet. Only bullets that received at least
/// one keyword appear in an assignment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordAssignment {
    pub work_index: usize,
    pub bullet_index: usize,
    pub assigned_keywords: Vec<String>,
}

/// Outcome of one bullet rewrite.
///
/// `keywords_used` is derived from the rewritten text, never taken from the
/// generator's own report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletRewriteResult {
    pub work_index: usize,
    pub bullet_index: usize,
    pub original_bullet: String,
    pub rewritten_bullet: String,
    pub keywords_used: Vec<String>,
}

/// Immutable record of one completed optimization. Only `deleted_at` changes
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRun {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: Option<String>,
    pub file_name: Option<String>,
    pub job_description: String,
    pub job: JobFacts,
    pub original_resume: ResumeDocument,
    pub optimized_resume: ResumeDocument,
    pub keyword_assignments: Vec<KeywordAssignment>,
    pub bullet_rewrites: Vec<BulletRewriteResult>,
    pub summary: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Row shape for history views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub id: Uuid,
    pub target_title: String,
    pub target_company: String,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OptimizationRunRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: Option<String>,
    pub file_name: Option<String>,
    pub job_description: String,
    pub target_title: String,
    pub target_company: String,
    pub seniority: String,
    pub keywords: Vec<String>,
    pub requirements: Vec<String>,
    pub original_resume: Value,
    pub optimized_resume: Value,
    pub keyword_assignments: Value,
    pub bullet_rewrites: Value,
    pub summary: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<OptimizationRunRow> for OptimizationRun {
    type Error = anyhow::Error;

    fn try_from(row: OptimizationRunRow) -> Result<Self, Self::Error> {
        Ok(OptimizationRun {
            id: row.id,
            user_id: row.user_id,
            template_id: row.template_id,
            file_name: row.file_name,
            job_description: row.job_description,
            job: JobFacts {
                target_title: row.target_title,
                target_company: row.target_company,
                seniority: row.seniority,
                keywords: row.keywords,
                requirements: row.requirements,
            },
            original_resume: serde_json::from_value(row.original_resume)
                .context("stored original_resume is not a valid résumé document")?,
            optimized_resume: serde_json::from_value(row.optimized_resume)
                .context("stored optimized_resume is not a valid résumé document")?,
            keyword_assignments: serde_json::from_value(row.keyword_assignments)
                .context("stored keyword_assignments are malformed")?,
            bullet_rewrites: serde_json::from_value(row.bullet_rewrites)
                .context("stored bullet_rewrites are malformed")?,
            summary: row.summary,
            skills: row.skills,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_row() -> OptimizationRunRow {
        OptimizationRunRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            template_id: None,
            file_name: Some("cv.pdf".to_string()),
            job_description: "Backend role".to_string(),
            target_title: "Backend Engineer".to_string(),
            target_company: "Acme".to_string(),
            seniority: "senior".to_string(),
            keywords: vec!["Rust".to_string()],
            requirements: vec![],
            original_resume: json!({"name": "Ada", "work": []}),
            optimized_resume: json!({"name": "Ada", "work": []}),
            keyword_assignments: json!([
                {"workIndex": 0, "bulletIndex": 1, "assignedKeywords": ["Rust"]}
            ]),
            bullet_rewrites: json!([]),
            summary: String::new(),
            skills: vec![],
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_row_converts_to_run() {
        let run = OptimizationRun::try_from(make_row()).unwrap();
        assert_eq!(run.job.target_company, "Acme");
        assert_eq!(run.original_resume.name, "Ada");
        assert_eq!(run.keyword_assignments[0].bullet_index, 1);
    }

    #[test]
    fn test_row_with_corrupt_snapshot_fails_conversion() {
        let mut row = make_row();
        row.optimized_resume = json!("not a document");
        assert!(OptimizationRun::try_from(row).is_err());
    }

    #[test]
    fn test_bullet_rewrite_serializes_camel_case() {
        let result = BulletRewriteResult {
            work_index: 0,
            bullet_index: 2,
            original_bullet: "did stuff".into(),
            rewritten_bullet: "Shipped stuff".into(),
            keywords_used: vec![],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["bulletIndex"], 2);
        assert_eq!(value["rewrittenBullet"], "Shipped stuff");
    }
}
