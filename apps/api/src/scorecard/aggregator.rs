//! Weighted aggregation of per-metric scores into the two overall numbers.
//!
//! The same table is applied to the original and the optimized column, so the
//! two totals are always weight-comparable.

use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Context, Result};

use crate::models::scorecard::{MetricName, MetricScore};
use crate::scorecard::metrics::to_score;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricWeights {
    weights: BTreeMap<MetricName, f64>,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            weights: BTreeMap::from([
                (MetricName::KeywordMatch, 0.20),
                (MetricName::ExperienceAlignment, 0.15),
                (MetricName::BulletStrength, 0.15),
                (MetricName::RoleAlignment, 0.10),
                (MetricName::SkillsMatch, 0.15),
                (MetricName::EducationCertifications, 0.05),
                (MetricName::FormattingStructure, 0.10),
                (MetricName::CustomizationLevel, 0.10),
            ]),
        }
    }
}

impl MetricWeights {
    /// Parses `{"Keyword Match": 0.2, ...}`. Every metric must be named exactly
    /// once, weights must be finite and non-negative, and they must sum to 1.0.
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, f64> =
            serde_json::from_str(raw).context("weights must be a JSON object of numbers")?;

        let mut weights = BTreeMap::new();
        for (label, weight) in parsed {
            let Some(metric) = MetricName::from_label(&label) else {
                bail!("unknown metric '{label}'");
            };
            if !weight.is_finite() || weight < 0.0 {
                bail!("weight for '{label}' must be a non-negative number, got {weight}");
            }
            weights.insert(metric, weight);
        }

        for metric in MetricName::ALL {
            if !weights.contains_key(&metric) {
                bail!("missing weight for '{}'", metric.label());
            }
        }

        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            bail!("weights must sum to 1.0, got {sum}");
        }
        Ok(Self { weights })
    }

    pub fn weight(&self, metric: MetricName) -> f64 {
        self.weights.get(&metric).copied().unwrap_or(0.0)
    }

    /// Drops `metric` and rescales the remaining weights back to a 1.0 sum.
    #[cfg(test)]
    pub fn without(&self, metric: MetricName) -> Result<Self> {
        let mut weights = self.weights.clone();
        weights.remove(&metric);
        let remaining: f64 = weights.values().sum();
        if remaining <= 0.0 {
            bail!("no weight left after removing '{}'", metric.label());
        }
        for w in weights.values_mut() {
            *w /= remaining;
        }
        Ok(Self { weights })
    }

    /// Returns `(overall, original_overall)`. Metrics absent from the table
    /// contribute nothing.
    pub fn aggregate(&self, metrics: &[MetricScore]) -> (u32, u32) {
        let optimized = self.weighted_sum(metrics, |m| m.optimized_score);
        let original = self.weighted_sum(metrics, |m| m.original_score);
        (to_score(optimized), to_score(original))
    }

    fn weighted_sum(&self, metrics: &[MetricScore], score: impl Fn(&MetricScore) -> u32) -> f64 {
        metrics
            .iter()
            .map(|m| self.weight(m.name) * f64::from(score(m).min(100)))
            .sum()
    }
}
