//! Scorecard Engine: scores a persisted run's original and optimized résumés
//! against its job description, then upserts the result.
//!
//! Per-metric failures never abort scoring: generative calls fall back as
//! described in `fallback`, and embedding failures zero Customization Level.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm_client::embeddings::{cosine_similarity, Embedder};
use crate::llm_client::TextGenerator;
use crate::models::run::OptimizationRun;
use crate::models::scorecard::{MetricName, MetricScore, Scorecard, ScoreSource};
use crate::scorecard::aggregator::MetricWeights;
use crate::scorecard::fallback::{
    fallback_if_degenerate, refine_experience, role_alignment, ScorePair, ScoringInput,
};
use crate::scorecard::metrics::{self, to_score};
use crate::scorecard::red_flags::extract_red_flags;
use crate::store::RunStore;

#[derive(Clone)]
pub struct ScorecardEngine {
    store: Arc<dyn RunStore>,
    llm: Arc<dyn TextGenerator>,
    embedder: Arc<dyn Embedder>,
    weights: Arc<MetricWeights>,
}

impl ScorecardEngine {
    pub fn new(
        store: Arc<dyn RunStore>,
        llm: Arc<dyn TextGenerator>,
        embedder: Arc<dyn Embedder>,
        weights: Arc<MetricWeights>,
    ) -> Self {
        Self {
            store,
            llm,
            embedder,
            weights,
        }
    }

    /// Recomputes and upserts the scorecard for `run_id`. `None` when the run
    /// does not exist or was deleted.
    pub async fn score_run(&self, run_id: Uuid) -> Result<Option<Scorecard>> {
        let Some(run) = self.store.get_run(run_id).await? else {
            return Ok(None);
        };

        let scorecard = self.compute(&run, Utc::now().date_naive()).await;
        self.store.upsert_scorecard(&scorecard).await?;
        info!(
            "Scored run {run_id}: {} (original {})",
            scorecard.overall_score, scorecard.original_overall_score
        );
        Ok(Some(scorecard))
    }

    /// Scores every metric in `MetricName::ALL` order. Never fails.
    pub async fn compute(&self, run: &OptimizationRun, today: NaiveDate) -> Scorecard {
        let llm = self.llm.as_ref();
        let original = &run.original_resume;
        let optimized = &run.optimized_resume;
        let keywords = &run.job.keywords;

        let original_text = original.flatten_text();
        let optimized_text = optimized.flatten_text();
        let input = ScoringInput {
            job_description: &run.job_description,
            requirements: &run.job.requirements,
            original_text: &original_text,
            optimized_text: &optimized_text,
        };

        let mut metrics = Vec::with_capacity(MetricName::ALL.len());

        let keyword_pair = (
            metrics::keyword_match(original, keywords),
            metrics::keyword_match(optimized, keywords),
        );
        let (pair, source) =
            fallback_if_degenerate(llm, MetricName::KeywordMatch, keyword_pair, &input).await;
        metrics.push(metric(MetricName::KeywordMatch, pair, source));

        let experience_pair = (
            metrics::experience_alignment(original, &run.job, &run.job_description, today),
            metrics::experience_alignment(optimized, &run.job, &run.job_description, today),
        );
        let (pair, source) = refine_experience(llm, experience_pair, &input).await;
        metrics.push(metric(MetricName::ExperienceAlignment, pair, source));

        metrics.push(metric(
            MetricName::BulletStrength,
            (
                metrics::bullet_strength(original),
                metrics::bullet_strength(optimized),
            ),
            ScoreSource::Heuristic,
        ));

        let (pair, source) = role_alignment(llm, &input).await;
        metrics.push(metric(MetricName::RoleAlignment, pair, source));

        let original_skills = metrics::skills_match(original, keywords);
        let optimized_skills = metrics::skills_match(optimized, keywords);
        let (pair, source) = fallback_if_degenerate(
            llm,
            MetricName::SkillsMatch,
            (original_skills.score, optimized_skills.score),
            &input,
        )
        .await;
        metrics.push(metric(MetricName::SkillsMatch, pair, source));

        metrics.push(metric(
            MetricName::EducationCertifications,
            (
                metrics::education_certifications(original, today),
                metrics::education_certifications(optimized, today),
            ),
            ScoreSource::Heuristic,
        ));

        metrics.push(metric(
            MetricName::FormattingStructure,
            (
                metrics::formatting_structure(original),
                metrics::formatting_structure(optimized),
            ),
            ScoreSource::Heuristic,
        ));

        let pair = self.customization_level(&input).await;
        metrics.push(metric(
            MetricName::CustomizationLevel,
            pair,
            ScoreSource::Embedding,
        ));

        let (overall_score, original_overall_score) = self.weights.aggregate(&metrics);

        Scorecard {
            run_id: run.id,
            overall_score,
            original_overall_score,
            metrics,
            red_flags: extract_red_flags(optimized, today),
            missing_keywords: optimized_skills.missing,
            computed_at: Utc::now(),
        }
    }

    /// Cosine similarity of each résumé to the job description, as 0..=100.
    /// Any embedding failure scores both sides 0.
    async fn customization_level(&self, input: &ScoringInput<'_>) -> ScorePair {
        let texts = vec![
            input.job_description.to_string(),
            input.original_text.to_string(),
            input.optimized_text.to_string(),
        ];
        match self.embedder.embed(&texts).await {
            Ok(vectors) if vectors.len() == texts.len() => (
                similarity_score(&vectors[0], &vectors[1]),
                similarity_score(&vectors[0], &vectors[2]),
            ),
            Ok(vectors) => {
                warn!(
                    "Embedding service returned {} vectors for {} inputs, defaulting Customization Level to 0",
                    vectors.len(),
                    texts.len()
                );
                (0, 0)
            }
            Err(e) => {
                warn!("Embedding failed, defaulting Customization Level to 0: {e}");
                (0, 0)
            }
        }
    }
}

fn similarity_score(a: &[f32], b: &[f32]) -> u32 {
    to_score(f64::from(cosine_similarity(a, b).max(0.0)) * 100.0)
}

fn metric(name: MetricName, (original, optimized): ScorePair, source: ScoreSource) -> MetricScore {
    MetricScore {
        name,
        original_score: original.min(100),
        optimized_score: optimized.min(100),
        source,
    }
}
