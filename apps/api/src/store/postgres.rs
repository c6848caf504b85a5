use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::run::{OptimizationRun, OptimizationRunRow, RunSummary};
use crate::models::scorecard::{Scorecard, ScorecardRow};
use crate::store::RunStore;

/// PostgreSQL-backed run store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgRunStore {
    pool: PgPool,
}

impl PgRunStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunStore for PgRunStore {
    async fn create_run(&self, run: &OptimizationRun) -> Result<()> {
        let original = serde_json::to_value(&run.original_resume)
            .context("Failed to serialize original résumé")?;
        let optimized = serde_json::to_value(&run.optimized_resume)
            .context("Failed to serialize optimized résumé")?;
        let assignments = serde_json::to_value(&run.keyword_assignments)
            .context("Failed to serialize keyword assignments")?;
        let rewrites = serde_json::to_value(&run.bullet_rewrites)
            .context("Failed to serialize bullet rewrites")?;

        sqlx::query(
            r#"
            INSERT INTO optimization_runs
                (id, user_id, template_id, file_name, job_description,
                 target_title, target_company, seniority, keywords, requirements,
                 original_resume, optimized_resume, keyword_assignments, bullet_rewrites,
                 summary, skills, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(run.id)
        .bind(run.user_id)
        .bind(&run.template_id)
        .bind(&run.file_name)
        .bind(&run.job_description)
        .bind(&run.job.target_title)
        .bind(&run.job.target_company)
        .bind(&run.job.seniority)
        .bind(&run.job.keywords)
        .bind(&run.job.requirements)
        .bind(&original)
        .bind(&optimized)
        .bind(&assignments)
        .bind(&rewrites)
        .bind(&run.summary)
        .bind(&run.skills)
        .bind(run.created_at)
        .execute(&self.pool)
        .await?;

        info!("Persisted optimization run {} for user {}", run.id, run.user_id);
        Ok(())
    }

    async fn get_run(&self, run_id: Uuid) -> Result<Option<OptimizationRun>> {
        let row = sqlx::query_as::<_, OptimizationRunRow>(
            "SELECT * FROM optimization_runs WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(OptimizationRun::try_from).transpose()
    }

    async fn list_runs(&self, user_id: Uuid) -> Result<Vec<RunSummary>> {
        Ok(sqlx::query_as::<_, RunSummary>(
            r#"
            SELECT id, target_title, target_company, file_name, created_at
            FROM optimization_runs
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn soft_delete_run(&self, run_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE optimization_runs
            SET deleted_at = NOW()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(run_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn upsert_scorecard(&self, scorecard: &Scorecard) -> Result<()> {
        let metrics = serde_json::to_value(&scorecard.metrics)
            .context("Failed to serialize scorecard metrics")?;

        sqlx::query(
            r#"
            INSERT INTO scorecards
                (run_id, overall_score, original_overall_score, metrics,
                 red_flags, missing_keywords, computed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (run_id) DO UPDATE SET
                overall_score = EXCLUDED.overall_score,
                original_overall_score = EXCLUDED.original_overall_score,
                metrics = EXCLUDED.metrics,
                red_flags = EXCLUDED.red_flags,
                missing_keywords = EXCLUDED.missing_keywords,
                computed_at = EXCLUDED.computed_at
            "#,
        )
        .bind(scorecard.run_id)
        .bind(scorecard.overall_score as i32)
        .bind(scorecard.original_overall_score as i32)
        .bind(&metrics)
        .bind(&scorecard.red_flags)
        .bind(&scorecard.missing_keywords)
        .bind(scorecard.computed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_scorecard(&self, run_id: Uuid) -> Result<Option<Scorecard>> {
        let row = sqlx::query_as::<_, ScorecardRow>(
            r#"
            SELECT s.*
            FROM scorecards s
            JOIN optimization_runs r ON r.id = s.run_id
            WHERE s.run_id = $1 AND r.deleted_at IS NULL
            "#,
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Scorecard::try_from).transpose()
    }
}
