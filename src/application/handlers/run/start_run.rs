//! StartRunHandler - Command handler for starting a planning run.

use std::sync::Arc;

use super::{RunOutcome, WorkflowDriver};
use crate::domain::foundation::RunId;
use crate::domain::workflow::{WorkflowError, WorkflowState};
use crate::ports::RunStore;

/// Command to start a run on a document.
#[derive(Debug, Clone)]
pub struct StartRunCommand {
    pub document: String,
    /// File name or other label for the document.
    pub document_name: Option<String>,
    /// Caller-chosen id; a fresh one is generated when absent.
    pub run_id: Option<RunId>,
}

impl StartRunCommand {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            document_name: None,
            run_id: None,
        }
    }

    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = Some(name.into());
        self
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }
}

/// Handler for starting runs.
///
/// Analyzes the document, drafts the first plan and suspends at the review
/// gate.
pub struct StartRunHandler {
    driver: Arc<WorkflowDriver>,
}

impl StartRunHandler {
    pub fn new(driver: Arc<WorkflowDriver>) -> Self {
        Self { driver }
    }

    pub async fn handle(&self, cmd: StartRunCommand) -> Result<RunOutcome, WorkflowError> {
        // 1. Validate input
        let run_id = cmd.run_id.unwrap_or_default();
        if self.driver.store().exists(run_id).await? {
            return Err(WorkflowError::invalid_input(
                "run_id",
                format!("run {} already exists", run_id),
            ));
        }

        let mut state = WorkflowState::new(run_id, cmd.document, cmd.document_name)?
            .with_revision_limit(self.driver.revision_limit());

        // 2. Persist before the first model call so a failed run can be retried
        self.driver.persist(&mut state).await?;

        tracing::info!(
            run_id = %run_id,
            document = state.document_name().unwrap_or("<inline>"),
            chars = state.document().chars().count(),
            "Run started"
        );

        // 3. Analyze, generate, suspend
        self.driver.drive(&mut state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::storage::InMemoryRunStore;
    use crate::domain::workflow::RunStatus;
    use crate::ports::RunStore;

    fn handler(provider: &MockAIProvider, store: &InMemoryRunStore) -> StartRunHandler {
        StartRunHandler::new(Arc::new(WorkflowDriver::new(
            Arc::new(provider.clone()),
            Arc::new(store.clone()),
        )))
    }

    #[tokio::test]
    async fn start_suspends_for_review() {
        let provider = MockAIProvider::canned();
        let store = InMemoryRunStore::new();

        let outcome = handler(&provider, &store)
            .handle(StartRunCommand::new("Proposal for Project X").with_document_name("x.md"))
            .await
            .unwrap();

        let RunOutcome::AwaitingReview(handle) = outcome else {
            panic!("expected review handle");
        };
        assert_eq!(handle.revision, 0);
        assert_eq!(handle.remaining_revisions, None);
        assert!(handle.review_message.contains("Remaining revisions: unlimited"));
        assert_eq!(handle.plan.source_document(), Some("x.md"));

        let stored = store.load_state(handle.run_id).await.unwrap();
        assert_eq!(stored.status(), RunStatus::AwaitingReview);
    }

    #[tokio::test]
    async fn start_uses_given_run_id() {
        let provider = MockAIProvider::canned();
        let store = InMemoryRunStore::new();
        let run_id = RunId::new();

        let outcome = handler(&provider, &store)
            .handle(StartRunCommand::new("doc").with_run_id(run_id))
            .await
            .unwrap();

        assert_eq!(outcome.run_id(), run_id);
    }

    #[tokio::test]
    async fn start_rejects_reused_run_id() {
        let provider = MockAIProvider::canned();
        let store = InMemoryRunStore::new();
        let handler = handler(&provider, &store);
        let run_id = RunId::new();

        handler
            .handle(StartRunCommand::new("doc").with_run_id(run_id))
            .await
            .unwrap();
        let err = handler
            .handle(StartRunCommand::new("other doc").with_run_id(run_id))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidInput { ref field, .. } if field == "run_id"));
    }

    #[tokio::test]
    async fn start_rejects_blank_document() {
        let provider = MockAIProvider::canned();
        let store = InMemoryRunStore::new();

        let err = handler(&provider, &store)
            .handle(StartRunCommand::new("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidInput { .. }));
        assert_eq!(provider.call_count(), 0);
        assert_eq!(store.run_count().await, 0);
    }

    #[tokio::test]
    async fn failed_analysis_keeps_run_for_retry() {
        let provider = MockAIProvider::canned().with_error(MockError::Timeout { timeout_secs: 120 });
        let store = InMemoryRunStore::new();
        let run_id = RunId::new();

        let err = handler(&provider, &store)
            .handle(StartRunCommand::new("doc").with_run_id(run_id))
            .await
            .unwrap_err();

        assert!(err.is_resumable());
        let stored = store.load_state(run_id).await.unwrap();
        assert_eq!(stored.status(), RunStatus::Pending);
        assert!(stored.last_error().is_some());
    }
}
