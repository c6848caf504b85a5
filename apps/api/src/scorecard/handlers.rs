//! Axum route handlers for the Scorecard API.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::scorecard::Scorecard;
use crate::state::AppState;

/// POST /api/v1/runs/:id/scorecard
///
/// Recomputes the scorecard from the stored run and upserts it. Safe to call
/// repeatedly.
pub async fn handle_compute_scorecard(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<Scorecard>, AppError> {
    let scorecard = state
        .scorecard_engine()
        .score_run(run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Optimization run {run_id} not found")))?;
    Ok(Json(scorecard))
}

/// GET /api/v1/runs/:id/scorecard
///
/// Returns the last computed scorecard without recomputing.
pub async fn handle_get_scorecard(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<Scorecard>, AppError> {
    let scorecard = state
        .store
        .get_scorecard(run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No scorecard for run {run_id}")))?;
    Ok(Json(scorecard))
}
