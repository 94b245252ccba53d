//! Text views of a plan shown to the reviewer.

use super::presentation_plan::PresentationPlan;

impl PresentationPlan {
    /// Short header plus one numbered line per slide.
    ///
    /// ```text
    /// Presentation: Project X
    /// Slides: 2
    /// Duration: ~30 minutes
    ///
    /// Slide Structure:
    /// ----------------------------------------
    ///  1. [title          ] Project X
    ///  2. [closing        ] Thank You
    /// ```
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Presentation: {}", self.title()),
            format!("Slides: {}", self.slide_count()),
            format!("Duration: ~{} minutes", self.estimated_duration_minutes()),
            String::new(),
            "Slide Structure:".to_string(),
            "-".repeat(40),
        ];

        for (i, slide) in self.slides().iter().enumerate() {
            lines.push(format!(
                "{:2}. [{:15}] {}",
                i + 1,
                slide.kind().as_str(),
                slide.heading()
            ));
        }

        lines.join("\n")
    }

    /// Every populated field of every slide.
    pub fn detailed_view(&self) -> String {
        let mut lines = Vec::new();

        for (i, slide) in self.slides().iter().enumerate() {
            lines.push(String::new());
            lines.push(format!(
                "### Slide {}: {}",
                i + 1,
                slide.kind().as_str().to_uppercase()
            ));

            let mut last_list: Option<&str> = None;
            for (name, value) in slide.fields() {
                if is_list_field(name) {
                    if last_list != Some(name) {
                        lines.push(format!("  - {}:", name));
                        last_list = Some(name);
                    }
                    lines.push(format!("    • {}", value));
                } else {
                    last_list = None;
                    lines.push(format!("  - {}: {}", name, value));
                }
            }
        }

        lines.join("\n")
    }
}

fn is_list_field(name: &str) -> bool {
    matches!(name, "items" | "points")
}

#[cfg(test)]
mod tests {
    use crate::domain::plan::{KeyPoint, PresentationPlan, Slide};

    fn plan() -> PresentationPlan {
        PresentationPlan::new(
            "Project X",
            vec![
                Slide::title("Project X"),
                Slide::agenda(["Scope", "Budget"]),
                Slide::key_points("Budget", vec![KeyPoint::new("Total", "$50k")]),
            ],
        )
        .unwrap()
        .with_duration_minutes(15)
    }

    #[test]
    fn summary_lists_slides_with_padded_kind() {
        let summary = plan().summary();
        assert!(summary.starts_with("Presentation: Project X\nSlides: 3\nDuration: ~15 minutes"));
        assert!(summary.contains(" 1. [title          ] Project X"));
        assert!(summary.contains(" 3. [key_points     ] Budget"));
    }

    #[test]
    fn detailed_view_groups_list_items() {
        let view = plan().detailed_view();
        assert!(view.contains("### Slide 2: AGENDA"));
        assert!(view.contains("  - items:\n    • Scope\n    • Budget"));
        assert!(view.contains("  - points:\n    • Total: $50k"));
    }
}
