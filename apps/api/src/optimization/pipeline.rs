//! Optimization pipeline: sequences the stage functions for one run and streams
//! a progress frame after every stage.
//!
//! Flow: authenticating → extracting_jd_info → parsing_resume → mapping_keywords →
//!       rewriting_bullet (×N, document order) → rewriting_summary →
//!       rewriting_skills → persist → complete.
//!
//! Stages run strictly one after another; the skills prompt reads the optimized
//! summary, so the two section rewrites cannot run concurrently. Nothing is
//! persisted unless every required stage succeeded.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::job::JobFacts;
use crate::models::resume::ResumeDocument;
use crate::models::run::{BulletRewriteResult, KeywordAssignment, OptimizationRun};
use crate::optimization::bullet_rewriter::{rewrite_bullet, BulletTarget, UsedVerbs};
use crate::optimization::jd_extractor::extract_job_facts;
use crate::optimization::keyword_mapper::{keywords_for, map_keywords};
use crate::optimization::parse_cache::ParseCache;
use crate::optimization::progress::{ProgressEmitter, ProgressSink};
use crate::optimization::resume_parser::parse_resume;
use crate::optimization::section_rewriter::{rewrite_skills, rewrite_summary};
use crate::optimization::stages::{settle, PipelineError, Stage, StageError};
use crate::store::RunStore;

// ────────────────────────────────────────────────────────────────────────────
// Request / outcome
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub user_id: Uuid,
    pub resume_text: String,
    pub job_description: String,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl OptimizeRequest {
    /// Rejects requests that could never succeed, before any stage runs.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.resume_text.trim().is_empty() {
            return Err(AppError::Validation("resumeText cannot be empty".to_string()));
        }
        if self.job_description.trim().is_empty() {
            return Err(AppError::Validation(
                "jobDescription cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Payload of the `complete` frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOutcome {
    pub run_id: Uuid,
    pub job: JobFacts,
    pub optimized_resume: ResumeDocument,
    pub keyword_assignments: Vec<KeywordAssignment>,
    pub bullet_rewrites: Vec<BulletRewriteResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Pipeline {
    llm: Arc<dyn TextGenerator>,
    store: Arc<dyn RunStore>,
    parse_cache: ParseCache,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        store: Arc<dyn RunStore>,
        parse_cache: ParseCache,
    ) -> Self {
        Self {
            llm,
            store,
            parse_cache,
        }
    }

    /// Runs one optimization to completion, writing frames to `sink`. Always ends
    /// the stream with exactly one `complete` or `error` frame.
    pub async fn run<S: ProgressSink>(&self, request: OptimizeRequest, sink: S) {
        let mut progress = ProgressEmitter::new(sink);
        progress.started().await;

        let outcome = self
            .execute(request, &mut progress)
            .await
            .and_then(|outcome| {
                serde_json::to_value(&outcome).map_err(|e| PipelineError {
                    stage: Stage::Persist,
                    source: StageError::Malformed(e.to_string()),
                })
            });

        match outcome {
            Ok(data) => progress.complete(data).await,
            Err(e) => {
                error!("Optimization run aborted: {e}");
                progress.fail(e.to_string()).await;
            }
        }
    }

    async fn execute<S: ProgressSink>(
        &self,
        request: OptimizeRequest,
        progress: &mut ProgressEmitter<S>,
    ) -> Result<OptimizationOutcome, PipelineError> {
        let llm = self.llm.as_ref();

        // Identity is resolved upstream; the request carries the caller's user id.
        info!("Starting optimization run for user {}", request.user_id);
        progress.progress(Stage::Authenticating, None).await;

        let job = settle(
            Stage::ExtractingJdInfo,
            extract_job_facts(&request.job_description, llm).await,
            None,
        )?;
        info!(
            "JD extracted: title={:?}, {} keywords",
            job.target_title,
            job.keywords.len()
        );
        progress
            .progress(
                Stage::ExtractingJdInfo,
                Some(json!({
                    "targetTitle": job.target_title,
                    "targetCompany": job.target_company,
                    "keywordCount": job.keywords.len(),
                })),
            )
            .await;

        let parsed = settle(
            Stage::ParsingResume,
            parse_resume(&request.resume_text, llm, &self.parse_cache).await,
            None,
        )?;
        let original: ResumeDocument = (*parsed.document).clone();
        let total_bullets = original.bullet_count();
        info!(
            "Résumé parsed: {} work entries, {} bullets (cache hit: {})",
            original.work.len(),
            total_bullets,
            parsed.cache_hit
        );
        progress
            .progress(
                Stage::ParsingResume,
                Some(json!({ "bulletCount": total_bullets, "cacheHit": parsed.cache_hit })),
            )
            .await;

        let assignments = settle(
            Stage::MappingKeywords,
            map_keywords(&job.keywords, &original, llm).await,
            None,
        )?;
        progress
            .progress(
                Stage::MappingKeywords,
                Some(json!({ "assignedBullets": assignments.len() })),
            )
            .await;

        // Bullet loop: document order, verb memory folded through every call.
        let mut optimized = original.clone();
        let mut used_verbs = UsedVerbs::new();
        let mut rewrites = Vec::with_capacity(total_bullets);
        for (work_index, bullet_index, text) in original.bullets() {
            let target = BulletTarget {
                work_index,
                bullet_index,
                text,
                assigned_keywords: keywords_for(&assignments, work_index, bullet_index),
            };
            let (result, next_verbs) = settle(
                Stage::RewritingBullet,
                rewrite_bullet(llm, &job, target, used_verbs).await,
                None,
            )?;
            used_verbs = next_verbs;

            optimized.work[work_index].bullets[bullet_index] = result.rewritten_bullet.clone();
            progress
                .progress(
                    Stage::RewritingBullet,
                    Some(json!({
                        "workIndex": work_index,
                        "bulletIndex": bullet_index,
                        "completed": rewrites.len() + 1,
                        "total": total_bullets,
                    })),
                )
                .await;
            rewrites.push(result);
        }

        optimized.summary = settle(
            Stage::RewritingSummary,
            rewrite_summary(llm, &job, &optimized).await,
            Some(original.summary.clone()),
        )?;
        progress.progress(Stage::RewritingSummary, None).await;

        optimized.skills = settle(
            Stage::RewritingSkills,
            rewrite_skills(llm, &job, &original.skills, &optimized.summary).await,
            Some(original.skills.clone()),
        )?;
        progress.progress(Stage::RewritingSkills, None).await;

        let run = OptimizationRun {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            template_id: request.template_id,
            file_name: request.file_name,
            job_description: request.job_description,
            job,
            summary: optimized.summary.clone(),
            skills: optimized.skills.clone(),
            original_resume: original,
            optimized_resume: optimized,
            keyword_assignments: assignments,
            bullet_rewrites: rewrites,
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.store
            .create_run(&run)
            .await
            .map_err(|e| PipelineError {
                stage: Stage::Persist,
                source: StageError::Store(format!("{e:#}")),
            })?;
        info!(
            "Persisted optimization run {} ({} bullet rewrites)",
            run.id,
            run.bullet_rewrites.len()
        );
        progress
            .progress(Stage::Persist, Some(json!({ "runId": run.id })))
            .await;

        Ok(OptimizationOutcome {
            run_id: run.id,
            job: run.job,
            optimized_resume: run.optimized_resume,
            keyword_assignments: run.keyword_assignments,
            bullet_rewrites: run.bullet_rewrites,
        })
    }
}
