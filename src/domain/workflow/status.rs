//! Run status state machine.
//!
//! ```text
//! Pending ──▶ AwaitingReview ──approve──▶ Approved
//!                 │  ▲        ──reject───▶ Rejected
//!         feedback│  │regenerated
//!                 ▼  │
//!               Revising
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created; analysis and the first plan are not both done yet.
    Pending,

    /// A plan is waiting for a human decision. The only suspension point.
    AwaitingReview,

    /// Feedback was recorded and the plan is being regenerated.
    Revising,

    /// The reviewer accepted the plan. Terminal.
    Approved,

    /// The reviewer discarded the plan. Terminal.
    Rejected,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::AwaitingReview => "awaiting_review",
            RunStatus::Revising => "revising",
            RunStatus::Approved => "approved",
            RunStatus::Rejected => "rejected",
        }
    }

    /// Returns true while the run waits on a human.
    pub fn is_suspended(&self) -> bool {
        matches!(self, RunStatus::AwaitingReview)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateMachine for RunStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RunStatus::*;
        matches!(
            (self, target),
            (Pending, AwaitingReview)
                | (AwaitingReview, Approved)
                | (AwaitingReview, Rejected)
                | (AwaitingReview, Revising)
                | (Revising, AwaitingReview)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RunStatus::*;
        match self {
            Pending => vec![AwaitingReview],
            AwaitingReview => vec![Approved, Rejected, Revising],
            Revising => vec![AwaitingReview],
            Approved | Rejected => vec![],
        }
    }
}
