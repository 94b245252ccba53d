//! Human review decisions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

const APPROVE_WORDS: &[&str] = &["approve", "approved", "aprobar"];
const REJECT_WORDS: &[&str] = &["reject", "rejected", "rechazar"];

/// What the reviewer decided about the current plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "feedback", rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
    /// Requested changes, fed into the next generation.
    Feedback(String),
}

impl ReviewDecision {
    /// Creates a feedback decision, rejecting blank text.
    pub fn feedback(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("feedback"));
        }
        Ok(ReviewDecision::Feedback(text.trim().to_string()))
    }

    /// Interprets a free-text reviewer response.
    ///
    /// `approve`/`aprobar` and `reject`/`rechazar` (any case) are decisions;
    /// any other non-blank text is feedback.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_lowercase();
        if APPROVE_WORDS.contains(&normalized.as_str()) {
            Ok(ReviewDecision::Approve)
        } else if REJECT_WORDS.contains(&normalized.as_str()) {
            Ok(ReviewDecision::Reject)
        } else {
            Self::feedback(input)
        }
    }

    /// Short action name used in error messages.
    pub fn action(&self) -> &'static str {
        match self {
            ReviewDecision::Approve => "approve",
            ReviewDecision::Reject => "reject",
            ReviewDecision::Feedback(_) => "feedback",
        }
    }

    pub fn feedback_text(&self) -> Option<&str> {
        match self {
            ReviewDecision::Feedback(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewDecision::Feedback(text) => write!(f, "feedback: {}", text),
            other => write!(f, "{}", other.action()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_english_and_spanish_keywords() {
        assert_eq!(ReviewDecision::parse("approve").unwrap(), ReviewDecision::Approve);
        assert_eq!(ReviewDecision::parse("  APROBAR ").unwrap(), ReviewDecision::Approve);
        assert_eq!(ReviewDecision::parse("Reject").unwrap(), ReviewDecision::Reject);
        assert_eq!(ReviewDecision::parse("rechazar").unwrap(), ReviewDecision::Reject);
    }

    #[test]
    fn other_text_is_feedback() {
        let decision = ReviewDecision::parse("add a slide about risks").unwrap();
        assert_eq!(decision.feedback_text(), Some("add a slide about risks"));
        assert_eq!(decision.action(), "feedback");
    }

    #[test]
    fn sentence_containing_keyword_is_still_feedback() {
        let decision = ReviewDecision::parse("approve once the budget slide is fixed").unwrap();
        assert!(matches!(decision, ReviewDecision::Feedback(_)));
    }

    #[test]
    fn blank_input_is_rejected() {
        let err = ReviewDecision::parse("   ").unwrap_err();
        assert_eq!(err.field(), "feedback");
    }

    #[test]
    fn serializes_with_decision_tag() {
        let json = serde_json::to_value(ReviewDecision::Feedback("more charts".into())).unwrap();
        assert_eq!(json["decision"], "feedback");
        assert_eq!(json["feedback"], "more charts");

        let json = serde_json::to_value(ReviewDecision::Approve).unwrap();
        assert_eq!(json["decision"], "approve");
    }
}
