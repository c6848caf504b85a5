use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// The fixed metric set, in scorecard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricName {
    #[serde(rename = "Keyword Match")]
    KeywordMatch,
    #[serde(rename = "Experience Alignment")]
    ExperienceAlignment,
    #[serde(rename = "Bullet Strength")]
    BulletStrength,
    #[serde(rename = "Role Alignment")]
    RoleAlignment,
    #[serde(rename = "Skills Match")]
    SkillsMatch,
    #[serde(rename = "Education & Certifications")]
    EducationCertifications,
    #[serde(rename = "Formatting & Structure")]
    FormattingStructure,
    #[serde(rename = "Customization Level")]
    CustomizationLevel,
}

impl MetricName {
    pub const ALL: [MetricName; 8] = [
        MetricName::KeywordMatch,
        MetricName::ExperienceAlignment,
        MetricName::BulletStrength,
        MetricName::RoleAlignment,
        MetricName::SkillsMatch,
        MetricName::EducationCertifications,
        MetricName::FormattingStructure,
        MetricName::CustomizationLevel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricName::KeywordMatch => "Keyword Match",
            MetricName::ExperienceAlignment => "Experience Alignment",
            MetricName::BulletStrength => "Bullet Strength",
            MetricName::RoleAlignment => "Role Alignment",
            MetricName::SkillsMatch => "Skills Match",
            MetricName::EducationCertifications => "Education & Certifications",
            MetricName::FormattingStructure => "Formatting & Structure",
            MetricName::CustomizationLevel => "Customization Level",
        }
    }

    pub fn from_label(label: &str) -> Option<MetricName> {
        MetricName::ALL.into_iter().find(|m| m.label() == label)
    }
}

/// Where a metric's numbers came from: for transparency in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreSource {
    Heuristic,
    /// Heuristic was degenerate (0) and the generator's score was substituted.
    LlmFallback,
    /// Always scored by the generator.
    Llm,
    /// Heuristic refined by a generator score.
    Blended,
    Embedding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScore {
    pub name: MetricName,
    pub original_score: u32,
    pub optimized_score: u32,
    pub source: ScoreSource,
}

/// Derived scoring cache for one run. Recomputed and upserted on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub run_id: Uuid,
    pub overall_score: u32,
    pub original_overall_score: u32,
    pub metrics: Vec<MetricScore>,
    pub red_flags: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ScorecardRow {
    pub run_id: Uuid,
    pub overall_score: i32,
    pub original_overall_score: i32,
    pub metrics: Value,
    pub red_flags: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub computed_at: DateTime<Utc>,
}

impl TryFrom<ScorecardRow> for Scorecard {
    type Error = anyhow::Error;

    fn try_from(row: ScorecardRow) -> Result<Self, Self::Error> {
        Ok(Scorecard {
            run_id: row.run_id,
            overall_score: row.overall_score.clamp(0, 100) as u32,
            original_overall_score: row.original_overall_score.clamp(0, 100) as u32,
            metrics: serde_json::from_value(row.metrics)
                .context("stored scorecard metrics are malformed")?,
            red_flags: row.red_flags,
            missing_keywords: row.missing_keywords,
            computed_at: row.computed_at,
        })
    }
}
