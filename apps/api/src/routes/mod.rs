pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::optimization::handlers as optimization;
use crate::scorecard::handlers as scorecard;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Optimization API
        .route("/api/v1/optimize", post(optimization::handle_optimize))
        .route("/api/v1/runs", get(optimization::handle_list_runs))
        .route(
            "/api/v1/runs/:id",
            get(optimization::handle_get_run).delete(optimization::handle_delete_run),
        )
        // Scorecard API
        .route(
            "/api/v1/runs/:id/scorecard",
            post(scorecard::handle_compute_scorecard).get(scorecard::handle_get_scorecard),
        )
        .with_state(state)
}
