//! Workflow state aggregate.
//!
//! One `WorkflowState` record carries a run from the raw document to a
//! terminal decision. It is the unit of persistence: every step mutates it
//! through the methods below and the handlers save it afterwards.
//!
//! # Ownership
//!
//! The aggregate owns the review gate. It makes no model calls; the
//! application layer runs the analyzer and generator and hands their results
//! to `record_analysis` and `install_plan`.

use serde::{Deserialize, Serialize};

use super::{ReviewDecision, RunStatus, WorkflowError, WorkflowStep};
use crate::domain::analysis::DocumentAnalysis;
use crate::domain::foundation::{RunId, StateMachine, Timestamp};
use crate::domain::plan::PresentationPlan;

/// A plan that was replaced by a later revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRevision {
    /// Revision number the plan had while it was current.
    pub revision: u32,
    pub plan: PresentationPlan,
    /// Feedback the reviewer gave on this plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub created_at: Timestamp,
}

/// An approved plan, frozen as the output of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedPlan {
    pub run_id: RunId,
    pub revision: u32,
    pub status: RunStatus,
    pub plan: PresentationPlan,
    pub finalized_at: Timestamp,
}

/// Result of applying a review decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Finalized(FinalizedPlan),
    Rejected,
    /// Feedback recorded; the plan must be regenerated.
    RevisionRequested { feedback: String },
}

/// The shared record of a planning run.
///
/// # Invariants
///
/// - `document` is non-empty and never changes
/// - `analysis` is set at most once
/// - `history` is append-only; `history.len() == revision`
/// - `pending_decision` is only set while `status == Revising`
/// - terminal runs (`Approved`, `Rejected`) accept no further mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    run_id: RunId,
    document: String,
    #[serde(default)]
    document_name: Option<String>,
    #[serde(default)]
    analysis: Option<DocumentAnalysis>,
    #[serde(default)]
    current_plan: Option<PresentationPlan>,
    #[serde(default)]
    plan_generated_at: Option<Timestamp>,
    #[serde(default)]
    history: Vec<PlanRevision>,
    #[serde(default)]
    pending_decision: Option<ReviewDecision>,
    revision: u32,
    status: RunStatus,
    #[serde(default)]
    revision_limit: Option<u32>,
    #[serde(default)]
    last_error: Option<String>,
    #[serde(default)]
    finalized_at: Option<Timestamp>,
    /// Bumped on every save; stores reject out-of-order writes.
    version: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl WorkflowState {
    /// Creates a pending run holding only the document.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the document is blank
    pub fn new(
        run_id: RunId,
        document: impl Into<String>,
        document_name: Option<String>,
    ) -> Result<Self, WorkflowError> {
        let document = document.into();
        if document.trim().is_empty() {
            return Err(WorkflowError::invalid_input(
                "document",
                "document text must not be empty",
            ));
        }

        let now = Timestamp::now();
        Ok(Self {
            run_id,
            document,
            document_name,
            analysis: None,
            current_plan: None,
            plan_generated_at: None,
            history: Vec::new(),
            pending_decision: None,
            revision: 0,
            status: RunStatus::Pending,
            revision_limit: None,
            last_error: None,
            finalized_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Caps the number of feedback cycles. `None` means unbounded.
    pub fn with_revision_limit(mut self, limit: Option<u32>) -> Self {
        self.revision_limit = limit;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub fn analysis(&self) -> Option<&DocumentAnalysis> {
        self.analysis.as_ref()
    }

    pub fn current_plan(&self) -> Option<&PresentationPlan> {
        self.current_plan.as_ref()
    }

    /// Replaced plans, oldest first.
    pub fn history(&self) -> &[PlanRevision] {
        &self.history
    }

    pub fn pending_decision(&self) -> Option<&ReviewDecision> {
        self.pending_decision.as_ref()
    }

    /// Feedback waiting to be applied by the next regeneration.
    pub fn pending_feedback(&self) -> Option<&str> {
        self.pending_decision
            .as_ref()
            .and_then(ReviewDecision::feedback_text)
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn revision_limit(&self) -> Option<u32> {
        self.revision_limit
    }

    /// Feedback cycles left before the limit, if one is configured.
    pub fn remaining_revisions(&self) -> Option<u32> {
        self.revision_limit
            .map(|limit| limit.saturating_sub(self.revision))
    }

    /// Message of the failure that halted the run, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The model step a retry should run, if the run is halted mid-flight.
    pub fn next_step(&self) -> Option<WorkflowStep> {
        match self.status {
            RunStatus::Pending if self.analysis.is_none() => Some(WorkflowStep::Analyze),
            RunStatus::Pending => Some(WorkflowStep::Generate),
            RunStatus::Revising => Some(WorkflowStep::Revise),
            _ => None,
        }
    }

    /// The frozen plan of an approved run.
    pub fn finalized_plan(&self) -> Option<FinalizedPlan> {
        match (self.status, &self.current_plan, self.finalized_at) {
            (RunStatus::Approved, Some(plan), Some(finalized_at)) => Some(FinalizedPlan {
                run_id: self.run_id,
                revision: self.revision,
                status: RunStatus::Approved,
                plan: plan.clone(),
                finalized_at,
            }),
            _ => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Step results
    // ─────────────────────────────────────────────────────────────────────────

    /// Stores the analyzer output. Allowed once, before any plan exists.
    pub fn record_analysis(&mut self, analysis: DocumentAnalysis) -> Result<(), WorkflowError> {
        if self.status != RunStatus::Pending || self.analysis.is_some() {
            return Err(WorkflowError::invalid_transition(self.status, "analyze"));
        }

        self.analysis = Some(analysis);
        self.last_error = None;
        self.touch();
        Ok(())
    }

    /// Installs a freshly generated plan and suspends for review.
    ///
    /// From `Pending` this is the first plan (revision 0). From `Revising` the
    /// current plan moves to history together with the feedback it received,
    /// and the revision counter advances by one.
    pub fn install_plan(&mut self, plan: PresentationPlan) -> Result<(), WorkflowError> {
        let next = self
            .status
            .transition_to(RunStatus::AwaitingReview)
            .map_err(|_| WorkflowError::invalid_transition(self.status, "generate"))?;
        if self.analysis.is_none() {
            return Err(WorkflowError::invalid_transition(self.status, "generate"));
        }

        let now = Timestamp::now();
        if self.status == RunStatus::Revising {
            let feedback = self
                .pending_decision
                .take()
                .and_then(|d| d.feedback_text().map(str::to_string));
            if let Some(previous) = self.current_plan.take() {
                self.history.push(PlanRevision {
                    revision: self.revision,
                    plan: previous,
                    feedback,
                    created_at: self.plan_generated_at.unwrap_or(now),
                });
            }
            self.revision += 1;
        }

        self.current_plan = Some(plan);
        self.plan_generated_at = Some(now);
        self.status = next;
        self.last_error = None;
        self.touch();
        Ok(())
    }

    /// Notes why the last step failed so the run can be inspected and retried.
    pub fn record_failure(&mut self, step: WorkflowStep, message: impl std::fmt::Display) {
        self.last_error = Some(format!("{} failed: {}", step, message));
        self.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Review gate
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies a reviewer decision to a suspended run.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the run is awaiting review
    /// - `RevisionLimitReached` for feedback once the limit is used up; the
    ///   run stays in `AwaitingReview`
    pub fn apply(&mut self, decision: ReviewDecision) -> Result<GateOutcome, WorkflowError> {
        if self.status != RunStatus::AwaitingReview {
            return Err(WorkflowError::invalid_transition(
                self.status,
                decision.action(),
            ));
        }

        match decision {
            ReviewDecision::Approve => self.finalize().map(GateOutcome::Finalized),
            ReviewDecision::Reject => {
                self.status = self.transition(RunStatus::Rejected, "reject")?;
                self.touch();
                Ok(GateOutcome::Rejected)
            }
            ReviewDecision::Feedback(text) => {
                if let Some(limit) = self.revision_limit {
                    if self.revision >= limit {
                        return Err(WorkflowError::RevisionLimitReached { limit });
                    }
                }
                self.status = self.transition(RunStatus::Revising, "feedback")?;
                self.pending_decision = Some(ReviewDecision::Feedback(text.clone()));
                self.touch();
                Ok(GateOutcome::RevisionRequested { feedback: text })
            }
        }
    }

    /// Freezes the current plan as the run output.
    ///
    /// Idempotent on an approved run: the same `FinalizedPlan` comes back.
    pub fn finalize(&mut self) -> Result<FinalizedPlan, WorkflowError> {
        match self.status {
            RunStatus::AwaitingReview => {
                let next = self.transition(RunStatus::Approved, "finalize")?;
                if self.current_plan.is_none() {
                    return Err(WorkflowError::invalid_transition(self.status, "finalize"));
                }
                self.status = next;
                self.finalized_at = Some(Timestamp::now());
                self.touch();
            }
            RunStatus::Approved => {}
            other => return Err(WorkflowError::invalid_transition(other, "finalize")),
        }

        self.finalized_plan()
            .ok_or_else(|| WorkflowError::invalid_transition(self.status, "finalize"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Advances the version ahead of a save and returns it.
    pub fn advance_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    fn transition(&self, target: RunStatus, action: &str) -> Result<RunStatus, WorkflowError> {
        self.status
            .transition_to(target)
            .map_err(|_| WorkflowError::invalid_transition(self.status, action))
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
