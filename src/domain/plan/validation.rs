//! Validating constructors for model output.
//!
//! Model responses arrive as loosely shaped JSON. Nothing reaches the typed
//! plan until it has been checked here: the `slide_type` tag must name one of
//! the six kinds, every key must belong to that kind, required fields must be
//! present with the right JSON type. `null` on an optional field is treated as
//! absent.

use serde_json::{Map, Value};
use thiserror::Error;

use super::presentation_plan::{PresentationPlan, MAX_DURATION_MINUTES};
use super::slide::{Slide, SlideKind};

/// Keys accepted at the top level of a plan object.
const PLAN_FIELDS: &[&str] = &[
    "title",
    "description",
    "target_audience",
    "estimated_duration_minutes",
    "slides",
    "source_document",
];

/// Keys every slide kind accepts.
const COMMON_SLIDE_FIELDS: &[&str] = &["slide_type", "speaker_notes"];

/// A model response that does not fit the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct SchemaViolation {
    path: String,
    reason: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// JSON path of the offending value, e.g. `slides[2].points`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl PresentationPlan {
    /// Builds a plan from raw model JSON, rejecting any unrecognized shape.
    pub fn from_value(value: &Value) -> Result<Self, SchemaViolation> {
        let object = expect_object(value, "$")?;
        reject_unknown_keys(object, PLAN_FIELDS, "$")?;

        let title = required_string(object, "title", "title")?;
        let description = optional_string(object, "description", "description")?;
        let target_audience = optional_string(object, "target_audience", "target_audience")?;

        let slides_value = object
            .get("slides")
            .filter(|v| !v.is_null())
            .ok_or_else(|| SchemaViolation::new("slides", "missing required field"))?;
        let slides_array = slides_value
            .as_array()
            .ok_or_else(|| SchemaViolation::new("slides", "expected an array"))?;

        let slides = slides_array
            .iter()
            .enumerate()
            .map(|(index, slide)| Slide::from_value_at(slide, &format!("slides[{}]", index)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut plan = PresentationPlan::new(title, slides)?
            .with_description(description)
            .with_target_audience(target_audience);

        let source = optional_string(object, "source_document", "source_document")?;
        if !source.trim().is_empty() {
            plan = plan.with_source_document(source);
        }

        if let Some(duration) = object.get("estimated_duration_minutes").filter(|v| !v.is_null()) {
            let minutes = duration.as_u64().ok_or_else(|| {
                SchemaViolation::new("estimated_duration_minutes", "expected a positive integer")
            })?;
            if minutes == 0 || minutes > u64::from(MAX_DURATION_MINUTES) {
                return Err(SchemaViolation::new(
                    "estimated_duration_minutes",
                    format!("must be between 1 and {}, got {}", MAX_DURATION_MINUTES, minutes),
                ));
            }
            plan = plan.with_duration_minutes(minutes as u32);
        }

        Ok(plan)
    }
}

impl Slide {
    /// Builds one slide from raw model JSON.
    pub fn from_value(value: &Value) -> Result<Self, SchemaViolation> {
        Self::from_value_at(value, "$")
    }

    fn from_value_at(value: &Value, path: &str) -> Result<Self, SchemaViolation> {
        let object = expect_object(value, path)?;

        let tag_path = format!("{}.slide_type", path);
        let tag = object
            .get("slide_type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaViolation::new(&tag_path, "missing slide_type tag"))?;
        let kind: SlideKind = tag
            .parse()
            .map_err(|_| SchemaViolation::new(&tag_path, format!("unknown slide kind '{}'", tag)))?;

        for key in object.keys() {
            let allowed = COMMON_SLIDE_FIELDS.contains(&key.as_str())
                || kind.allowed_fields().contains(&key.as_str());
            if !allowed {
                return Err(SchemaViolation::new(
                    format!("{}.{}", path, key),
                    format!("field is not allowed on a '{}' slide", kind),
                ));
            }
        }

        let at = |field: &str| format!("{}.{}", path, field);
        let notes = optional_string(object, "speaker_notes", &at("speaker_notes"))?;

        let slide = match kind {
            SlideKind::Title => Slide::Title {
                title: required_string(object, "title", &at("title"))?,
                subtitle: optional_string(object, "subtitle", &at("subtitle"))?,
                author: optional_string(object, "author", &at("author"))?,
                date: optional_string(object, "date", &at("date"))?,
                speaker_notes: notes,
            },
            SlideKind::Agenda => Slide::Agenda {
                title: optional_string(object, "title", &at("title"))?
                    .if_empty("Agenda"),
                items: required_string_list(object, "items", &at("items"))?,
                speaker_notes: notes,
            },
            SlideKind::Content => Slide::Content {
                title: required_string(object, "title", &at("title"))?,
                body: required_string(object, "body", &at("body"))?,
                image_suggestion: optional_string(
                    object,
                    "image_suggestion",
                    &at("image_suggestion"),
                )?,
                speaker_notes: notes,
            },
            SlideKind::KeyPoints => Slide::KeyPoints {
                title: required_string(object, "title", &at("title"))?,
                points: required_points(object, &at("points"))?,
                speaker_notes: notes,
            },
            SlideKind::SectionHeader => Slide::SectionHeader {
                title: required_string(object, "title", &at("title"))?,
                subtitle: optional_string(object, "subtitle", &at("subtitle"))?,
                speaker_notes: notes,
            },
            SlideKind::Closing => Slide::Closing {
                title: optional_string(object, "title", &at("title"))?
                    .if_empty("Thank You"),
                message: optional_string(object, "message", &at("message"))?,
                speaker_notes: notes,
            },
        };

        Ok(slide)
    }
}

trait IfEmpty {
    fn if_empty(self, fallback: &str) -> String;
}

impl IfEmpty for String {
    fn if_empty(self, fallback: &str) -> String {
        if self.trim().is_empty() {
            fallback.to_string()
        } else {
            self
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Field helpers
// ════════════════════════════════════════════════════════════════════════════════

pub(crate) fn expect_object<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a Map<String, Value>, SchemaViolation> {
    value
        .as_object()
        .ok_or_else(|| SchemaViolation::new(path, "expected a JSON object"))
}

pub(crate) fn reject_unknown_keys(
    object: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
) -> Result<(), SchemaViolation> {
    match object.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(SchemaViolation::new(
            if path == "$" {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            },
            "unrecognized field",
        )),
        None => Ok(()),
    }
}

pub(crate) fn required_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, SchemaViolation> {
    match object.get(key) {
        None | Some(Value::Null) => Err(SchemaViolation::new(path, "missing required field")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(SchemaViolation::new(path, "must be a non-empty string"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(SchemaViolation::new(path, "expected a string")),
    }
}

pub(crate) fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, SchemaViolation> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(SchemaViolation::new(path, "expected a string")),
    }
}

pub(crate) fn optional_string_list(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Vec<String>, SchemaViolation> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| SchemaViolation::new(format!("{}[{}]", path, i), "expected a string"))
            })
            .collect(),
        Some(_) => Err(SchemaViolation::new(path, "expected an array of strings")),
    }
}

fn required_string_list(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Vec<String>, SchemaViolation> {
    if object.get(key).map_or(true, Value::is_null) {
        return Err(SchemaViolation::new(path, "missing required field"));
    }
    let items = optional_string_list(object, key, path)?;
    if items.is_empty() {
        return Err(SchemaViolation::new(path, "must contain at least one item"));
    }
    Ok(items)
}

fn required_points(
    object: &Map<String, Value>,
    path: &str,
) -> Result<Vec<super::KeyPoint>, SchemaViolation> {
    let items = match object.get("points") {
        None | Some(Value::Null) => {
            return Err(SchemaViolation::new(path, "missing required field"))
        }
        Some(Value::Array(items)) => items,
        Some(_) => return Err(SchemaViolation::new(path, "expected an array of points")),
    };
    if items.is_empty() {
        return Err(SchemaViolation::new(path, "must contain at least one point"));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let point_path = format!("{}[{}]", path, i);
            let point = expect_object(item, &point_path)?;
            reject_unknown_keys(point, &["heading", "title", "description"], &point_path)?;

            let heading_key = if point.contains_key("heading") {
                "heading"
            } else {
                "title"
            };
            Ok(super::KeyPoint {
                heading: required_string(point, heading_key, &format!("{}.heading", point_path))?,
                description: optional_string(
                    point,
                    "description",
                    &format!("{}.description", point_path),
                )?,
            })
        })
        .collect()
}
