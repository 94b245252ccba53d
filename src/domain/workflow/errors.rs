//! Workflow error types.

use thiserror::Error;

use super::{RunStatus, WorkflowStep};
use crate::domain::foundation::{ErrorCode, RunId, ValidationError};
use crate::ports::{AIError, RunStoreError};

/// Everything that can halt or refuse a workflow operation.
///
/// Every variant maps to an [`ErrorCode`] so callers receive both a kind and
/// a human-readable message.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The model call itself failed.
    #[error("model invocation failed during {step}: {source}")]
    ModelInvocation {
        step: WorkflowStep,
        #[source]
        source: AIError,
    },

    /// The model answered, but not in the expected shape.
    #[error("model output failed validation during {step}: {reason}")]
    SchemaValidation { step: WorkflowStep, reason: String },

    /// The action is not allowed in the run's current status.
    #[error("cannot {action} a run in status '{status}'")]
    InvalidStateTransition { status: RunStatus, action: String },

    /// Caller-supplied input was rejected.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The configured maximum number of revisions has been used up.
    #[error("revision limit of {limit} reached; approve or reject the current plan")]
    RevisionLimitReached { limit: u32 },

    #[error("run not found: {0}")]
    RunNotFound(RunId),

    #[error("storage error: {0}")]
    Storage(#[source] RunStoreError),
}

impl WorkflowError {
    pub fn model_invocation(step: WorkflowStep, source: AIError) -> Self {
        WorkflowError::ModelInvocation { step, source }
    }

    pub fn schema_validation(step: WorkflowStep, reason: impl Into<String>) -> Self {
        WorkflowError::SchemaValidation {
            step,
            reason: reason.into(),
        }
    }

    pub fn invalid_transition(status: RunStatus, action: impl Into<String>) -> Self {
        WorkflowError::InvalidStateTransition {
            status,
            action: action.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        WorkflowError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowError::ModelInvocation { .. } => ErrorCode::ModelInvocationFailed,
            WorkflowError::SchemaValidation { .. } => ErrorCode::SchemaValidationFailed,
            WorkflowError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            WorkflowError::InvalidInput { .. } => ErrorCode::InvalidInput,
            WorkflowError::RevisionLimitReached { .. } => ErrorCode::RevisionLimitReached,
            WorkflowError::RunNotFound(_) => ErrorCode::RunNotFound,
            WorkflowError::Storage(_) => ErrorCode::StorageError,
        }
    }

    /// Returns true if the run can be picked up again with a retry.
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            WorkflowError::ModelInvocation { .. }
                | WorkflowError::SchemaValidation { .. }
                | WorkflowError::Storage(_)
        )
    }
}

impl From<RunStoreError> for WorkflowError {
    fn from(err: RunStoreError) -> Self {
        match err {
            RunStoreError::NotFound(id) => WorkflowError::RunNotFound(id),
            other => WorkflowError::Storage(other),
        }
    }
}

impl From<ValidationError> for WorkflowError {
    fn from(err: ValidationError) -> Self {
        WorkflowError::InvalidInput {
            field: err.field().to_string(),
            reason: err.to_string(),
        }
    }
}
