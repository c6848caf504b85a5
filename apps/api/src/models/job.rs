use serde::{Deserialize, Serialize};

/// Facts extracted from a job description by the extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFacts {
    #[serde(default)]
    pub target_title: String,
    #[serde(default)]
    pub target_company: String,
    /// "junior", "mid", "senior", "staff", "principal", "director", or "unknown".
    #[serde(default)]
    pub seniority: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}
