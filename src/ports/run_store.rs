//! Run Store Port - Interface for persisting workflow runs.
//!
//! A run is saved after every step, keyed by run id, so a suspended run can be
//! resumed by a later process. Writes are guarded by the state's version:
//! each save must carry exactly the stored version plus one.

use async_trait::async_trait;

use crate::domain::foundation::RunId;
use crate::domain::workflow::{FinalizedPlan, RunStatus, WorkflowState};

/// Errors that can occur during run storage operations
#[derive(Debug, thiserror::Error)]
pub enum RunStoreError {
    #[error("Run not found: {0}")]
    NotFound(RunId),

    #[error("Version conflict for run {run_id}: stored version is {stored}, save carried {attempted}")]
    VersionConflict {
        run_id: RunId,
        stored: u64,
        attempted: u64,
    },

    #[error("Final plan not found for run: {0}")]
    PlanNotFound(RunId),

    #[error("Failed to serialize run: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize run: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Listing entry for a stored run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: RunId,
    pub status: RunStatus,
    pub revision: u32,
    pub document_name: Option<String>,
    pub plan_title: Option<String>,
}

impl RunSummary {
    pub fn from_state(state: &WorkflowState) -> Self {
        Self {
            run_id: state.run_id(),
            status: state.status(),
            revision: state.revision(),
            document_name: state.document_name().map(str::to_string),
            plan_title: state.current_plan().map(|p| p.title().to_string()),
        }
    }
}

/// Checks the single-writer rule shared by every store.
///
/// The first save of a run must carry version 1; later saves must carry the
/// stored version plus one.
pub fn check_version(
    run_id: RunId,
    stored: Option<u64>,
    attempted: u64,
) -> Result<(), RunStoreError> {
    let expected = stored.unwrap_or(0) + 1;
    if attempted == expected {
        Ok(())
    } else {
        Err(RunStoreError::VersionConflict {
            run_id,
            stored: stored.unwrap_or(0),
            attempted,
        })
    }
}

/// Port for persisting and loading workflow runs
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Save run state
    ///
    /// # Errors
    /// Returns `RunStoreError::VersionConflict` if `state.version()` is not
    /// exactly one past the stored version
    async fn save_state(&self, state: &WorkflowState) -> Result<(), RunStoreError>;

    /// Load run state
    ///
    /// # Errors
    /// Returns `RunStoreError::NotFound` if no state exists
    async fn load_state(&self, run_id: RunId) -> Result<WorkflowState, RunStoreError>;

    /// Check if state exists for a run
    async fn exists(&self, run_id: RunId) -> Result<bool, RunStoreError>;

    /// Delete all stored data for a run
    async fn delete(&self, run_id: RunId) -> Result<(), RunStoreError>;

    /// List every stored run, ordered by run id
    async fn list_runs(&self) -> Result<Vec<RunSummary>, RunStoreError>;

    /// Save the approved plan artifact
    async fn save_final_plan(
        &self,
        run_id: RunId,
        plan: &FinalizedPlan,
    ) -> Result<(), RunStoreError>;

    /// Load the approved plan artifact
    ///
    /// # Errors
    /// Returns `RunStoreError::PlanNotFound` if the run was never approved
    async fn load_final_plan(&self, run_id: RunId) -> Result<FinalizedPlan, RunStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_save_must_carry_version_one() {
        let id = RunId::new();
        assert!(check_version(id, None, 1).is_ok());
        assert!(matches!(
            check_version(id, None, 2),
            Err(RunStoreError::VersionConflict { stored: 0, attempted: 2, .. })
        ));
    }

    #[test]
    fn later_saves_must_advance_by_one() {
        let id = RunId::new();
        assert!(check_version(id, Some(3), 4).is_ok());
        assert!(check_version(id, Some(3), 3).is_err());
        assert!(check_version(id, Some(3), 5).is_err());
    }

    #[test]
    fn not_found_error_displays_run_id() {
        let id = RunId::new();
        let err = RunStoreError::NotFound(id);
        assert_eq!(err.to_string(), format!("Run not found: {}", id));
    }
}
