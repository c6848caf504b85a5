//! Run store: persistence for optimization runs and their scorecards.
//!
//! Runs are written once at pipeline completion and never mutated except for
//! the soft-delete marker. Scorecards are a derived cache keyed by run id and
//! always upserted.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::run::{OptimizationRun, RunSummary};
use crate::models::scorecard::Scorecard;

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Carried in `AppState` as `Arc<dyn RunStore>`.
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn create_run(&self, run: &OptimizationRun) -> Result<()>;

    /// Returns `None` for unknown and soft-deleted runs.
    async fn get_run(&self, run_id: Uuid) -> Result<Option<OptimizationRun>>;

    /// History view: the user's live runs, newest first.
    async fn list_runs(&self, user_id: Uuid) -> Result<Vec<RunSummary>>;

    /// Returns false if the run does not exist, belongs to someone else, or is
    /// already deleted.
    async fn soft_delete_run(&self, run_id: Uuid, user_id: Uuid) -> Result<bool>;

    async fn upsert_scorecard(&self, scorecard: &Scorecard) -> Result<()>;

    async fn get_scorecard(&self, run_id: Uuid) -> Result<Option<Scorecard>>;
}
