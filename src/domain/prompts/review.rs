//! Message shown to the reviewer while a run awaits review.

use super::templates::fill;
use crate::domain::plan::PresentationPlan;

const REVIEW_PLAN_TEMPLATE: &str = r#"## Presentation Plan Review (revision {revision})

{summary}

## Detailed Slide Content:
{detailed_view}

---
**Please review the plan above and respond with one of the following:**
- **"approve"** - Accept this plan and finalize it
- **"reject"** - Reject this plan entirely
- **Your feedback** - Describe the specific changes you would like

Remaining revisions: {remaining_revisions}"#;

/// Renders the review message for the current plan.
///
/// `remaining` is `None` when no revision limit is configured.
pub fn review_message(plan: &PresentationPlan, revision: u32, remaining: Option<u32>) -> String {
    let remaining = match remaining {
        Some(n) => n.to_string(),
        None => "unlimited".to_string(),
    };

    fill(
        REVIEW_PLAN_TEMPLATE,
        &[
            ("revision", &revision.to_string()),
            ("summary", &plan.summary()),
            ("detailed_view", &plan.detailed_view()),
            ("remaining_revisions", &remaining),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::Slide;

    fn plan() -> PresentationPlan {
        PresentationPlan::new(
            "Project X",
            vec![Slide::title("Project X"), Slide::content("Budget", "$50k")],
        )
        .unwrap()
    }

    #[test]
    fn message_contains_summary_details_and_options() {
        let message = review_message(&plan(), 2, Some(1));
        assert!(message.contains("revision 2"));
        assert!(message.contains("Presentation: Project X"));
        assert!(message.contains("### Slide 2: CONTENT"));
        assert!(message.contains("  - body: $50k"));
        assert!(message.contains("\"approve\""));
        assert!(message.ends_with("Remaining revisions: 1"));
    }

    #[test]
    fn unbounded_runs_show_unlimited() {
        let message = review_message(&plan(), 0, None);
        assert!(message.ends_with("Remaining revisions: unlimited"));
    }
}
