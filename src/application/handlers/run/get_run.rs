//! GetRunHandler / ListRunsHandler - Query handlers for stored runs.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{RunId, Timestamp};
use crate::domain::plan::PresentationPlan;
use crate::domain::prompts::review_message;
use crate::domain::workflow::{FinalizedPlan, RunStatus, WorkflowError};
use crate::ports::{RunStore, RunStoreError, RunSummary};

/// Query for one run.
#[derive(Debug, Clone)]
pub struct GetRunQuery {
    pub run_id: RunId,
}

/// Read model of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunView {
    pub run_id: RunId,
    pub status: RunStatus,
    pub revision: u32,
    pub document_name: Option<String>,
    pub current_plan: Option<PresentationPlan>,
    pub history_len: usize,
    /// Present while the run awaits review.
    pub review_message: Option<String>,
    pub remaining_revisions: Option<u32>,
    pub pending_feedback: Option<String>,
    pub last_error: Option<String>,
    pub finalized: Option<FinalizedPlan>,
    /// Whether the approved plan artifact exists in the store.
    pub final_plan_saved: bool,
    pub updated_at: Timestamp,
}

/// Handler for reading a run.
pub struct GetRunHandler {
    store: Arc<dyn RunStore>,
}

impl GetRunHandler {
    pub fn new(store: Arc<dyn RunStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetRunQuery) -> Result<RunView, WorkflowError> {
        let state = self.store.load_state(query.run_id).await?;

        let review_message = match (state.status(), state.current_plan()) {
            (RunStatus::AwaitingReview, Some(plan)) => Some(review_message(
                plan,
                state.revision(),
                state.remaining_revisions(),
            )),
            _ => None,
        };

        // The stored artifact wins; the state's copy covers a missing file.
        let (finalized, final_plan_saved) = if state.status() == RunStatus::Approved {
            match self.store.load_final_plan(query.run_id).await {
                Ok(plan) => (Some(plan), true),
                Err(RunStoreError::PlanNotFound(_)) => (state.finalized_plan(), false),
                Err(err) => return Err(err.into()),
            }
        } else {
            (None, false)
        };

        Ok(RunView {
            run_id: state.run_id(),
            status: state.status(),
            revision: state.revision(),
            document_name: state.document_name().map(str::to_string),
            current_plan: state.current_plan().cloned(),
            history_len: state.history().len(),
            review_message,
            remaining_revisions: state.remaining_revisions(),
            pending_feedback: state.pending_feedback().map(str::to_string),
            last_error: state.last_error().map(str::to_string),
            finalized,
            final_plan_saved,
            updated_at: *state.updated_at(),
        })
    }
}

/// Handler for listing runs.
pub struct ListRunsHandler {
    store: Arc<dyn RunStore>,
}

impl ListRunsHandler {
    pub fn new(store: Arc<dyn RunStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<Vec<RunSummary>, WorkflowError> {
        Ok(self.store.list_runs().await?)
    }
}
