//! Workflow module - The run record and its review gate.
//!
//! # Components
//!
//! - `RunStatus` - Lifecycle state machine (pending, awaiting review, revising, terminal)
//! - `ReviewDecision` - Approve, reject or free-text feedback
//! - `WorkflowState` - The persisted run aggregate
//! - `WorkflowError` - Error taxonomy surfaced to callers

mod decision;
mod errors;
mod state;
mod status;
mod step;

pub use decision::ReviewDecision;
pub use errors::WorkflowError;
pub use state::{FinalizedPlan, GateOutcome, PlanRevision, WorkflowState};
pub use status::RunStatus;
pub use step::WorkflowStep;
