use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed steps of a planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Analyze,
    Generate,
    Revise,
    Review,
    Finalize,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::Analyze => "analyze",
            WorkflowStep::Generate => "generate",
            WorkflowStep::Revise => "revise",
            WorkflowStep::Review => "review",
            WorkflowStep::Finalize => "finalize",
        }
    }

    /// Steps that call the language model.
    pub fn calls_model(&self) -> bool {
        matches!(
            self,
            WorkflowStep::Analyze | WorkflowStep::Generate | WorkflowStep::Revise
        )
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
