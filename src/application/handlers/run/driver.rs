//! WorkflowDriver - runs model steps and persists the run after each one.

use std::sync::Arc;

use serde::Serialize;

use crate::application::steps::{DocumentAnalyzer, PlanGenerator, Revision};
use crate::config::WorkflowConfig;
use crate::domain::foundation::RunId;
use crate::domain::plan::PresentationPlan;
use crate::domain::prompts::review_message;
use crate::domain::workflow::{FinalizedPlan, RunStatus, WorkflowError, WorkflowState, WorkflowStep};
use crate::ports::{AIProvider, RunStore};

/// What the caller gets back when a run stops moving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Suspended at the review gate.
    AwaitingReview(ReviewHandle),
    Approved(FinalizedPlan),
    Rejected { run_id: RunId, revision: u32 },
}

impl RunOutcome {
    pub fn run_id(&self) -> RunId {
        match self {
            RunOutcome::AwaitingReview(handle) => handle.run_id,
            RunOutcome::Approved(plan) => plan.run_id,
            RunOutcome::Rejected { run_id, .. } => *run_id,
        }
    }

    pub fn status(&self) -> RunStatus {
        match self {
            RunOutcome::AwaitingReview(_) => RunStatus::AwaitingReview,
            RunOutcome::Approved(_) => RunStatus::Approved,
            RunOutcome::Rejected { .. } => RunStatus::Rejected,
        }
    }
}

/// Everything a reviewer needs to decide on the current plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewHandle {
    pub run_id: RunId,
    pub revision: u32,
    pub plan: PresentationPlan,
    pub review_message: String,
    /// `None` when revisions are unbounded.
    pub remaining_revisions: Option<u32>,
}

impl ReviewHandle {
    /// Builds the handle for a run suspended at the review gate.
    pub fn from_state(state: &WorkflowState) -> Option<Self> {
        if state.status() != RunStatus::AwaitingReview {
            return None;
        }
        let plan = state.current_plan()?;
        Some(Self {
            run_id: state.run_id(),
            revision: state.revision(),
            plan: plan.clone(),
            review_message: review_message(plan, state.revision(), state.remaining_revisions()),
            remaining_revisions: state.remaining_revisions(),
        })
    }
}

/// Shared engine behind the run handlers.
///
/// Owns the model steps and the store. Every state change is persisted
/// before the driver moves on, so a crash or a failed model call leaves the
/// run at its last successful step.
pub struct WorkflowDriver {
    store: Arc<dyn RunStore>,
    analyzer: DocumentAnalyzer,
    generator: PlanGenerator,
    revision_limit: Option<u32>,
}

impl WorkflowDriver {
    pub fn new(provider: Arc<dyn AIProvider>, store: Arc<dyn RunStore>) -> Self {
        Self {
            store,
            analyzer: DocumentAnalyzer::new(provider.clone()),
            generator: PlanGenerator::new(provider),
            revision_limit: None,
        }
    }

    /// Applies token budgets and the revision limit from configuration.
    pub fn with_config(mut self, config: &WorkflowConfig) -> Self {
        self.analyzer = self.analyzer.with_max_tokens(config.analysis_max_tokens);
        self.generator = self.generator.with_max_tokens(config.plan_max_tokens);
        self.revision_limit = config.max_revisions;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.analyzer = self.analyzer.with_temperature(temperature);
        self.generator = self.generator.with_temperature(temperature);
        self
    }

    pub fn with_revision_limit(mut self, limit: Option<u32>) -> Self {
        self.revision_limit = limit;
        self
    }

    pub fn revision_limit(&self) -> Option<u32> {
        self.revision_limit
    }

    pub fn store(&self) -> &Arc<dyn RunStore> {
        &self.store
    }

    pub(crate) async fn load(&self, run_id: RunId) -> Result<WorkflowState, WorkflowError> {
        Ok(self.store.load_state(run_id).await?)
    }

    /// Bumps the version and saves.
    pub(crate) async fn persist(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        let version = state.advance_version();
        self.store.save_state(state).await?;
        tracing::debug!(
            run_id = %state.run_id(),
            status = %state.status(),
            version,
            "Run state saved"
        );
        Ok(())
    }

    /// Writes the approved plan artifact next to the run state.
    pub(crate) async fn save_final_plan(&self, finalized: &FinalizedPlan) -> Result<(), WorkflowError> {
        self.store.save_final_plan(finalized.run_id, finalized).await?;
        tracing::info!(
            run_id = %finalized.run_id,
            revision = finalized.revision,
            slides = finalized.plan.slide_count(),
            "Final plan saved"
        );
        Ok(())
    }

        /// Runs model steps until the run suspends or a step fails.
    ///
    /// A failing step is recorded on the state and persisted before the
    /// error is returned.
    pub(crate) async fn drive(&self, state: &mut WorkflowState) -> Result<RunOutcome, WorkflowError> {
        while let Some(step) = state.next_step() {
            if let Err(err) = self.run_step(state, step).await {
                if err.is_resumable() {
                    tracing::warn!(
                        run_id = %state.run_id(),
                        step = %step,
                        code = %err.code(),
                        error = %err,
                        "Workflow step failed; run can be retried"
                    );
                    state.record_failure(step, &err);
                    self.persist(state).await?;
                }
                return Err(err);
            }
            self.persist(state).await?;
        }

        Self::outcome(state)
    }

    async fn run_step(
        &self,
        state: &mut WorkflowState,
        step: WorkflowStep,
    ) -> Result<(), WorkflowError> {
        let run_id = state.run_id();
        match step {
            WorkflowStep::Analyze => {
                let analysis = self.analyzer.analyze(run_id, state.document()).await?;
                state.record_analysis(analysis)
            }
            WorkflowStep::Generate | WorkflowStep::Revise => {
                let analysis = state
                    .analysis()
                    .ok_or_else(|| WorkflowError::invalid_transition(state.status(), "generate"))?;
                let revision = match step {
                    WorkflowStep::Revise => Some(Revision {
                        current_plan: state.current_plan().ok_or_else(|| {
                            WorkflowError::invalid_transition(state.status(), "revise")
                        })?,
                        feedback: state.pending_feedback().ok_or_else(|| {
                            WorkflowError::invalid_transition(state.status(), "revise")
                        })?,
                    }),
                    _ => None,
                };

                let plan = self
                    .generator
                    .generate(
                        run_id,
                        analysis,
                        state.document(),
                        revision,
                        state.document_name(),
                    )
                    .await?;
                state.install_plan(plan)?;

                tracing::info!(
                    run_id = %run_id,
                    revision = state.revision(),
                    "Plan ready for review"
                );
                Ok(())
            }
            WorkflowStep::Review | WorkflowStep::Finalize => {
                Err(WorkflowError::invalid_transition(state.status(), step.as_str()))
            }
        }
    }

    /// Describes where a run that stopped moving ended up.
    pub(crate) fn outcome(state: &WorkflowState) -> Result<RunOutcome, WorkflowError> {
        match state.status() {
            RunStatus::AwaitingReview => ReviewHandle::from_state(state)
                .map(RunOutcome::AwaitingReview)
                .ok_or_else(|| WorkflowError::invalid_transition(state.status(), "review")),
            RunStatus::Approved => state
                .finalized_plan()
                .map(RunOutcome::Approved)
                .ok_or_else(|| WorkflowError::invalid_transition(state.status(), "finalize")),
            RunStatus::Rejected => Ok(RunOutcome::Rejected {
                run_id: state.run_id(),
                revision: state.revision(),
            }),
            status @ (RunStatus::Pending | RunStatus::Revising) => {
                Err(WorkflowError::invalid_transition(status, "suspend"))
            }
        }
    }
}
