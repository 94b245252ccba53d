//! RetryRunHandler - re-drives a run halted by a failed model step.

use std::sync::Arc;

use super::{RunOutcome, WorkflowDriver};
use crate::domain::foundation::RunId;
use crate::domain::workflow::{RunStatus, WorkflowError, WorkflowState};
use crate::ports::{RunStore, RunStoreError};

/// Command to retry the step a run stopped at.
#[derive(Debug, Clone)]
pub struct RetryRunCommand {
    pub run_id: RunId,
}

/// Handler for retrying halted runs.
///
/// Picks up at the last successful step: analysis when no analysis exists,
/// generation when no plan exists, regeneration when feedback is pending.
/// An approved run whose final plan was never written gets it written again.
pub struct RetryRunHandler {
    driver: Arc<WorkflowDriver>,
}

impl RetryRunHandler {
    pub fn new(driver: Arc<WorkflowDriver>) -> Self {
        Self { driver }
    }

    pub async fn handle(&self, cmd: RetryRunCommand) -> Result<RunOutcome, WorkflowError> {
        let mut state = self.driver.load(cmd.run_id).await?;

        if state.status() == RunStatus::Approved {
            return self.resave_final_plan(&state).await;
        }

        let Some(step) = state.next_step() else {
            return Err(WorkflowError::invalid_transition(state.status(), "retry"));
        };

        tracing::info!(
            run_id = %cmd.run_id,
            step = %step,
            last_error = state.last_error().unwrap_or(""),
            "Retrying run"
        );

        self.driver.drive(&mut state).await
    }

    async fn resave_final_plan(&self, state: &WorkflowState) -> Result<RunOutcome, WorkflowError> {
        match self.driver.store().load_final_plan(state.run_id()).await {
            Ok(_) => Err(WorkflowError::invalid_transition(state.status(), "retry")),
            Err(RunStoreError::PlanNotFound(_)) => {
                let finalized = state
                    .finalized_plan()
                    .ok_or_else(|| WorkflowError::invalid_transition(state.status(), "retry"))?;
                tracing::info!(run_id = %state.run_id(), "Rewriting missing final plan");
                self.driver.save_final_plan(&finalized).await?;
                Ok(RunOutcome::Approved(finalized))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::storage::InMemoryRunStore;
    use crate::application::handlers::run::{
        StartRunCommand, StartRunHandler, SubmitReviewCommand, SubmitReviewHandler,
    };
    use crate::domain::workflow::{FinalizedPlan, ReviewDecision};
    use crate::ports::{RunStore, RunSummary};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store whose plan writes fail while `fail_plans` is set.
    #[derive(Clone, Default)]
    struct PlanWriteFailingStore {
        inner: InMemoryRunStore,
        fail_plans: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RunStore for PlanWriteFailingStore {
        async fn save_state(&self, state: &WorkflowState) -> Result<(), RunStoreError> {
            self.inner.save_state(state).await
        }

        async fn load_state(&self, run_id: RunId) -> Result<WorkflowState, RunStoreError> {
            self.inner.load_state(run_id).await
        }

        async fn exists(&self, run_id: RunId) -> Result<bool, RunStoreError> {
            self.inner.exists(run_id).await
        }

        async fn delete(&self, run_id: RunId) -> Result<(), RunStoreError> {
            self.inner.delete(run_id).await
        }

        async fn list_runs(&self) -> Result<Vec<RunSummary>, RunStoreError> {
            self.inner.list_runs().await
        }

        async fn save_final_plan(
            &self,
            run_id: RunId,
            plan: &FinalizedPlan,
        ) -> Result<(), RunStoreError> {
            if self.fail_plans.load(Ordering::SeqCst) {
                return Err(RunStoreError::IoError("disk full".into()));
            }
            self.inner.save_final_plan(run_id, plan).await
        }

        async fn load_final_plan(&self, run_id: RunId) -> Result<FinalizedPlan, RunStoreError> {
            self.inner.load_final_plan(run_id).await
        }
    }

    fn handlers(provider: &MockAIProvider, store: &InMemoryRunStore) -> (StartRunHandler, RetryRunHandler) {
        let driver = Arc::new(WorkflowDriver::new(
            Arc::new(provider.clone()),
            Arc::new(store.clone()),
        ));
        (StartRunHandler::new(driver.clone()), RetryRunHandler::new(driver))
    }

    #[tokio::test]
    async fn retry_resumes_after_failed_generation() {
        let provider = MockAIProvider::canned()
            .with_json(json!({"main_topic": "Project X"}))
            .with_response("not json at all");
        let store = InMemoryRunStore::new();
        let (start, retry) = handlers(&provider, &store);
        let run_id = RunId::new();

        let err = start
            .handle(StartRunCommand::new("doc").with_run_id(run_id))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::SchemaValidation { .. }));

        let outcome = retry.handle(RetryRunCommand { run_id }).await.unwrap();

        assert_eq!(outcome.status(), RunStatus::AwaitingReview);
        // analysis was not repeated
        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.last_call().unwrap().metadata.step, "generate");
        let stored = store.load_state(run_id).await.unwrap();
        assert_eq!(stored.analysis().unwrap().main_topic, "Project X");
        assert!(stored.last_error().is_none());
    }

    #[tokio::test]
    async fn retry_of_suspended_run_is_invalid() {
        let provider = MockAIProvider::canned();
        let store = InMemoryRunStore::new();
        let (start, retry) = handlers(&provider, &store);

        let run_id = start.handle(StartRunCommand::new("doc")).await.unwrap().run_id();
        let err = retry.handle(RetryRunCommand { run_id }).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::InvalidStateTransition { status: RunStatus::AwaitingReview, .. }
        ));
    }

    #[tokio::test]
    async fn retry_can_fail_again() {
        let provider = MockAIProvider::canned()
            .with_error(MockError::RateLimited { retry_after_secs: 5 })
            .with_error(MockError::RateLimited { retry_after_secs: 5 });
        let store = InMemoryRunStore::new();
        let (start, retry) = handlers(&provider, &store);
        let run_id = RunId::new();

        start
            .handle(StartRunCommand::new("doc").with_run_id(run_id))
            .await
            .unwrap_err();
        let err = retry.handle(RetryRunCommand { run_id }).await.unwrap_err();
        assert!(err.is_resumable());

        let outcome = retry.handle(RetryRunCommand { run_id }).await.unwrap();
        assert_eq!(outcome.status(), RunStatus::AwaitingReview);
    }

    #[tokio::test]
    async fn retry_rewrites_final_plan_after_failed_write() {
        let store = PlanWriteFailingStore::default();
        let driver = Arc::new(WorkflowDriver::new(
            Arc::new(MockAIProvider::canned()),
            Arc::new(store.clone()),
        ));
        let start = StartRunHandler::new(driver.clone());
        let review = SubmitReviewHandler::new(driver.clone());
        let retry = RetryRunHandler::new(driver);

        let run_id = start.handle(StartRunCommand::new("doc")).await.unwrap().run_id();
        store.fail_plans.store(true, Ordering::SeqCst);
        let err = review
            .handle(SubmitReviewCommand {
                run_id,
                decision: ReviewDecision::Approve,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Storage(_)));
        assert!(err.is_resumable());
        let state = store.load_state(run_id).await.unwrap();
        assert_eq!(state.status(), RunStatus::Approved);
        assert!(matches!(
            store.load_final_plan(run_id).await,
            Err(RunStoreError::PlanNotFound(_))
        ));

        store.fail_plans.store(false, Ordering::SeqCst);
        let outcome = retry.handle(RetryRunCommand { run_id }).await.unwrap();

        let RunOutcome::Approved(finalized) = outcome else {
            panic!("expected approval");
        };
        assert_eq!(Some(finalized.clone()), state.finalized_plan());
        assert_eq!(store.load_final_plan(run_id).await.unwrap(), finalized);

        let err = retry.handle(RetryRunCommand { run_id }).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidStateTransition { status: RunStatus::Approved, .. }
        ));
    }
}
