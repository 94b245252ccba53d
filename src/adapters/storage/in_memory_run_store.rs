//! In-Memory Run Store Adapter
//!
//! Stores run state and final plans in memory.
//! Useful for testing and for the `memory` storage backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::RunId;
use crate::domain::workflow::{FinalizedPlan, WorkflowState};
use crate::ports::{check_version, RunStore, RunStoreError, RunSummary};

/// In-memory storage for workflow runs
#[derive(Debug, Clone, Default)]
pub struct InMemoryRunStore {
    states: Arc<RwLock<HashMap<RunId, WorkflowState>>>,
    plans: Arc<RwLock<HashMap<RunId, FinalizedPlan>>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.states.write().await.clear();
        self.plans.write().await.clear();
    }

    /// Get the number of stored runs
    pub async fn run_count(&self) -> usize {
        self.states.read().await.len()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn save_state(&self, state: &WorkflowState) -> Result<(), RunStoreError> {
        let mut states = self.states.write().await;
        let stored = states.get(&state.run_id()).map(WorkflowState::version);
        check_version(state.run_id(), stored, state.version())?;
        states.insert(state.run_id(), state.clone());
        Ok(())
    }

    async fn load_state(&self, run_id: RunId) -> Result<WorkflowState, RunStoreError> {
        let states = self.states.read().await;
        states
            .get(&run_id)
            .cloned()
            .ok_or(RunStoreError::NotFound(run_id))
    }

    async fn exists(&self, run_id: RunId) -> Result<bool, RunStoreError> {
        Ok(self.states.read().await.contains_key(&run_id))
    }

    async fn delete(&self, run_id: RunId) -> Result<(), RunStoreError> {
        self.states.write().await.remove(&run_id);
        self.plans.write().await.remove(&run_id);
        Ok(())
    }

    async fn list_runs(&self) -> Result<Vec<RunSummary>, RunStoreError> {
        let states = self.states.read().await;
        let mut runs: Vec<RunSummary> = states.values().map(RunSummary::from_state).collect();
        runs.sort_by_key(|summary| summary.run_id);
        Ok(runs)
    }

    async fn save_final_plan(
        &self,
        run_id: RunId,
        plan: &FinalizedPlan,
    ) -> Result<(), RunStoreError> {
        self.plans.write().await.insert(run_id, plan.clone());
        Ok(())
    }

    async fn load_final_plan(&self, run_id: RunId) -> Result<FinalizedPlan, RunStoreError> {
        self.plans
            .read()
            .await
            .get(&run_id)
            .cloned()
            .ok_or(RunStoreError::PlanNotFound(run_id))
    }
}
