//! Axum route handlers for the Optimization API.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::run::{OptimizationRun, RunSummary};
use crate::optimization::pipeline::OptimizeRequest;
use crate::optimization::progress::ChannelSink;
use crate::state::AppState;

/// Frames buffered between the pipeline task and the response body.
const PROGRESS_BUFFER: usize = 32;

const NDJSON: &str = "application/x-ndjson";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// POST /api/v1/optimize
///
/// Validates the request, then streams progress frames as newline-delimited
/// JSON while the pipeline runs on its own task. A client that disconnects only
/// stops receiving frames; the run itself continues to completion.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Response, AppError> {
    request.validate()?;

    let (sink, stream) = ChannelSink::pair(PROGRESS_BUFFER);
    let pipeline = state.pipeline();
    tokio::spawn(async move {
        pipeline.run(request, sink).await;
    });

    Ok(([(header::CONTENT_TYPE, NDJSON)], Body::from_stream(stream)).into_response())
}

/// GET /api/v1/runs?userId=
pub async fn handle_list_runs(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<RunSummary>>, AppError> {
    let runs = state.store.list_runs(query.user_id).await?;
    Ok(Json(runs))
}

/// GET /api/v1/runs/:id
pub async fn handle_get_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<OptimizationRun>, AppError> {
    let run = state
        .store
        .get_run(run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Optimization run {run_id} not found")))?;
    Ok(Json(run))
}

/// DELETE /api/v1/runs/:id?userId=
///
/// Soft delete. The run disappears from every read path but its row is kept.
pub async fn handle_delete_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> Result<StatusCode, AppError> {
    if !state.store.soft_delete_run(run_id, query.user_id).await? {
        return Err(AppError::NotFound(format!(
            "Optimization run {run_id} not found"
        )));
    }
    info!("Soft-deleted optimization run {run_id}");
    Ok(StatusCode::NO_CONTENT)
}
