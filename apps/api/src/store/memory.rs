//! In-memory run store used by tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::run::{OptimizationRun, RunSummary};
use crate::models::scorecard::Scorecard;
use crate::store::RunStore;

#[derive(Default)]
pub struct MemoryRunStore {
    runs: Mutex<HashMap<Uuid, OptimizationRun>>,
    scorecards: Mutex<HashMap<Uuid, Scorecard>>,
    fail_writes: bool,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `create_run` always fails.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Every stored run, including soft-deleted ones.
    pub fn all_runs(&self) -> Vec<OptimizationRun> {
        self.runs.lock().unwrap().values().cloned().collect()
    }

    pub fn scorecard_count(&self) -> usize {
        self.scorecards.lock().unwrap().len()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn create_run(&self, run: &OptimizationRun) -> Result<()> {
        if self.fail_writes {
            bail!("store unavailable");
        }
        let mut runs = self.runs.lock().unwrap();
        if runs.contains_key(&run.id) {
            bail!("run {} already exists", run.id);
        }
        runs.insert(run.id, run.clone());
        Ok(())
    }

    async fn get_run(&self, run_id: Uuid) -> Result<Option<OptimizationRun>> {
        Ok(self
            .runs
            .lock()
            .unwrap()
            .get(&run_id)
            .filter(|r| r.deleted_at.is_none())
            .cloned())
    }

    async fn list_runs(&self, user_id: Uuid) -> Result<Vec<RunSummary>> {
        let mut runs: Vec<RunSummary> = self
            .runs
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id && r.deleted_at.is_none())
            .map(|r| RunSummary {
                id: r.id,
                target_title: r.job.target_title.clone(),
                target_company: r.job.target_company.clone(),
                file_name: r.file_name.clone(),
                created_at: r.created_at,
            })
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(runs)
    }

    async fn soft_delete_run(&self, run_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut runs = self.runs.lock().unwrap();
        match runs.get_mut(&run_id) {
            Some(run) if run.user_id == user_id && run.deleted_at.is_none() => {
                run.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn upsert_scorecard(&self, scorecard: &Scorecard) -> Result<()> {
        self.scorecards
            .lock()
            .unwrap()
            .insert(scorecard.run_id, scorecard.clone());
        Ok(())
    }

    async fn get_scorecard(&self, run_id: Uuid) -> Result<Option<Scorecard>> {
        if self.get_run(run_id).await?.is_none() {
            return Ok(None);
        }
        Ok(self.scorecards.lock().unwrap().get(&run_id).cloned())
    }
}
