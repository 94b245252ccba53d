//! Extracted facts about a source document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::plan::{
    expect_object, optional_string, optional_string_list, reject_unknown_keys, required_string,
    SchemaViolation,
};

const ANALYSIS_FIELDS: &[&str] = &[
    "main_topic",
    "key_entities",
    "key_sections",
    "technical_highlights",
    "economic_highlights",
    "timeline",
    "target_audience",
    "suggested_tone",
];

/// Tone used when the model does not suggest one.
pub const DEFAULT_TONE: &str = "professional";

/// Facts the analyzer pulled out of a document.
///
/// Set once per run and read by every plan generation that follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub main_topic: String,
    #[serde(default)]
    pub key_entities: Vec<String>,
    #[serde(default)]
    pub key_sections: Vec<String>,
    #[serde(default)]
    pub technical_highlights: Vec<String>,
    #[serde(default)]
    pub economic_highlights: Vec<String>,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default = "default_tone")]
    pub suggested_tone: String,
}

fn default_tone() -> String {
    DEFAULT_TONE.to_string()
}

impl DocumentAnalysis {
    /// Creates an analysis with only the main topic set.
    pub fn new(main_topic: impl Into<String>) -> Self {
        Self {
            main_topic: main_topic.into(),
            key_entities: Vec::new(),
            key_sections: Vec::new(),
            technical_highlights: Vec::new(),
            economic_highlights: Vec::new(),
            timeline: String::new(),
            target_audience: String::new(),
            suggested_tone: default_tone(),
        }
    }

    /// Builds an analysis from raw model JSON.
    ///
    /// `main_topic` is required. Every other field may be missing or `null`.
    pub fn from_value(value: &Value) -> Result<Self, SchemaViolation> {
        let object = expect_object(value, "$")?;
        reject_unknown_keys(object, ANALYSIS_FIELDS, "$")?;

        let suggested_tone = optional_string(object, "suggested_tone", "suggested_tone")?;

        Ok(Self {
            main_topic: required_string(object, "main_topic", "main_topic")?,
            key_entities: optional_string_list(object, "key_entities", "key_entities")?,
            key_sections: optional_string_list(object, "key_sections", "key_sections")?,
            technical_highlights: optional_string_list(
                object,
                "technical_highlights",
                "technical_highlights",
            )?,
            economic_highlights: optional_string_list(
                object,
                "economic_highlights",
                "economic_highlights",
            )?,
            timeline: optional_string(object, "timeline", "timeline")?,
            target_audience: optional_string(object, "target_audience", "target_audience")?,
            suggested_tone: if suggested_tone.trim().is_empty() {
                default_tone()
            } else {
                suggested_tone
            },
        })
    }

    /// Case-insensitive search across every extracted fact.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        std::iter::once(&self.main_topic)
            .chain(&self.key_entities)
            .chain(&self.key_sections)
            .chain(&self.technical_highlights)
            .chain(&self.economic_highlights)
            .chain(std::iter::once(&self.timeline))
            .chain(std::iter::once(&self.target_audience))
            .any(|fact| fact.to_lowercase().contains(&needle))
    }
}
