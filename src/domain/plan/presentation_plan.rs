//! Presentation plan aggregate.

use serde::{Deserialize, Serialize};

use super::slide::{Slide, SlideKind};
use super::validation::SchemaViolation;

/// Default talk length when the model does not estimate one.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Upper bound accepted for `estimated_duration_minutes`.
pub const MAX_DURATION_MINUTES: u32 = 600;

/// An ordered sequence of slides plus deck-level metadata.
///
/// # Invariants
///
/// - `title` is non-empty
/// - `slides` holds at least one slide, in presentation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationPlan {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    target_audience: String,
    #[serde(default = "default_duration")]
    estimated_duration_minutes: u32,
    slides: Vec<Slide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_document: Option<String>,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

impl PresentationPlan {
    /// Creates a plan, enforcing the title and non-empty slide invariants.
    pub fn new(title: impl Into<String>, slides: Vec<Slide>) -> Result<Self, SchemaViolation> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(SchemaViolation::new("title", "must be a non-empty string"));
        }
        if slides.is_empty() {
            return Err(SchemaViolation::new("slides", "a plan needs at least one slide"));
        }

        Ok(Self {
            title,
            description: String::new(),
            target_audience: String::new(),
            estimated_duration_minutes: DEFAULT_DURATION_MINUTES,
            slides,
            source_document: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.estimated_duration_minutes = minutes;
        self
    }

    /// Tags the plan with the document it was generated from.
    pub fn with_source_document(mut self, source: impl Into<String>) -> Self {
        self.source_document = Some(source.into());
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_audience(&self) -> &str {
        &self.target_audience
    }

    pub fn estimated_duration_minutes(&self) -> u32 {
        self.estimated_duration_minutes
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn source_document(&self) -> Option<&str> {
        self.source_document.as_deref()
    }

    /// Kinds of every slide, in order.
    pub fn kinds(&self) -> Vec<SlideKind> {
        self.slides.iter().map(Slide::kind).collect()
    }

    /// Slides of one kind, in order.
    pub fn slides_of_kind(&self, kind: SlideKind) -> impl Iterator<Item = &Slide> {
        self.slides.iter().filter(move |slide| slide.kind() == kind)
    }
}
