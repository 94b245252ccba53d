//! SubmitReviewHandler - Command handler for the review gate.

use std::sync::Arc;

use super::{RunOutcome, WorkflowDriver};
use crate::domain::foundation::RunId;
use crate::domain::workflow::{GateOutcome, ReviewDecision, WorkflowError};
use crate::ports::RunStore;

/// Command carrying a reviewer's decision on a suspended run.
#[derive(Debug, Clone)]
pub struct SubmitReviewCommand {
    pub run_id: RunId,
    pub decision: ReviewDecision,
}

/// Handler for review decisions.
///
/// - approve: finalize, persist the state, then the final plan (a failed plan
///   write is completed by retrying the run)
/// - reject: persist the terminal state
/// - feedback: persist the revising state, regenerate, suspend again
pub struct SubmitReviewHandler {
    driver: Arc<WorkflowDriver>,
}

impl SubmitReviewHandler {
    pub fn new(driver: Arc<WorkflowDriver>) -> Self {
        Self { driver }
    }

    pub async fn handle(&self, cmd: SubmitReviewCommand) -> Result<RunOutcome, WorkflowError> {
        if let ReviewDecision::Feedback(text) = &cmd.decision {
            if text.trim().is_empty() {
                return Err(WorkflowError::invalid_input(
                    "feedback",
                    "feedback must not be empty",
                ));
            }
        }

        let mut state = self.driver.load(cmd.run_id).await?;
        let action = cmd.decision.action();
        let gate = state.apply(cmd.decision)?;

        tracing::info!(
            run_id = %cmd.run_id,
            decision = action,
            revision = state.revision(),
            status = %state.status(),
            "Review decision applied"
        );

        match gate {
            GateOutcome::Finalized(finalized) => {
                self.driver.persist(&mut state).await?;
                self.driver.save_final_plan(&finalized).await?;
                Ok(RunOutcome::Approved(finalized))
            }
            GateOutcome::Rejected => {
                self.driver.persist(&mut state).await?;
                Ok(RunOutcome::Rejected {
                    run_id: cmd.run_id,
                    revision: state.revision(),
                })
            }
            GateOutcome::RevisionRequested { .. } => {
                self.driver.persist(&mut state).await?;
                self.driver.drive(&mut state).await
            }
        }
    }
}
