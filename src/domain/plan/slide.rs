//! Slide value objects.
//!
//! A slide is a closed set of six kinds. Each kind owns its own fields, so a
//! `Title` slide can never carry agenda items and a `Closing` slide can never
//! carry key points.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The six slide kinds a plan may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    Title,
    Agenda,
    Content,
    KeyPoints,
    SectionHeader,
    Closing,
}

impl SlideKind {
    /// Every kind, in catalogue order.
    pub const ALL: [SlideKind; 6] = [
        SlideKind::Title,
        SlideKind::Agenda,
        SlideKind::Content,
        SlideKind::KeyPoints,
        SlideKind::SectionHeader,
        SlideKind::Closing,
    ];

    /// Wire name used in the `slide_type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideKind::Title => "title",
            SlideKind::Agenda => "agenda",
            SlideKind::Content => "content",
            SlideKind::KeyPoints => "key_points",
            SlideKind::SectionHeader => "section_header",
            SlideKind::Closing => "closing",
        }
    }

    /// Fields a slide of this kind may carry, besides `slide_type` and `speaker_notes`.
    pub fn allowed_fields(&self) -> &'static [&'static str] {
        match self {
            SlideKind::Title => &["title", "subtitle", "author", "date"],
            SlideKind::Agenda => &["title", "items"],
            SlideKind::Content => &["title", "body", "image_suggestion"],
            SlideKind::KeyPoints => &["title", "points"],
            SlideKind::SectionHeader => &["title", "subtitle"],
            SlideKind::Closing => &["title", "message"],
        }
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SlideKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlideKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format("slide_type", format!("unknown slide kind '{}'", s))
            })
    }
}

/// One highlighted point on a `key_points` slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    #[serde(alias = "title")]
    pub heading: String,
    #[serde(default)]
    pub description: String,
}

impl KeyPoint {
    pub fn new(heading: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            description: description.into(),
        }
    }
}

/// A single typed slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slide_type", rename_all = "snake_case")]
pub enum Slide {
    /// Opening slide of the deck.
    Title {
        title: String,
        #[serde(default)]
        subtitle: String,
        #[serde(default)]
        author: String,
        #[serde(default)]
        date: String,
        #[serde(default)]
        speaker_notes: String,
    },
    /// Outline of what the deck covers.
    Agenda {
        #[serde(default = "default_agenda_title")]
        title: String,
        items: Vec<String>,
        #[serde(default)]
        speaker_notes: String,
    },
    /// General purpose title and body.
    Content {
        title: String,
        body: String,
        #[serde(default)]
        image_suggestion: String,
        #[serde(default)]
        speaker_notes: String,
    },
    /// Headed list of highlights.
    KeyPoints {
        title: String,
        points: Vec<KeyPoint>,
        #[serde(default)]
        speaker_notes: String,
    },
    /// Divider introducing a new section.
    SectionHeader {
        title: String,
        #[serde(default)]
        subtitle: String,
        #[serde(default)]
        speaker_notes: String,
    },
    /// Final slide with a call to action.
    Closing {
        #[serde(default = "default_closing_title")]
        title: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        speaker_notes: String,
    },
}

fn default_agenda_title() -> String {
    "Agenda".to_string()
}

fn default_closing_title() -> String {
    "Thank You".to_string()
}

impl Slide {
    /// Creates a title slide with only its heading set.
    pub fn title(title: impl Into<String>) -> Self {
        Slide::Title {
            title: title.into(),
            subtitle: String::new(),
            author: String::new(),
            date: String::new(),
            speaker_notes: String::new(),
        }
    }

    /// Creates an agenda slide.
    pub fn agenda<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Slide::Agenda {
            title: default_agenda_title(),
            items: items.into_iter().map(Into::into).collect(),
            speaker_notes: String::new(),
        }
    }

    /// Creates a content slide.
    pub fn content(title: impl Into<String>, body: impl Into<String>) -> Self {
        Slide::Content {
            title: title.into(),
            body: body.into(),
            image_suggestion: String::new(),
            speaker_notes: String::new(),
        }
    }

    /// Creates a key points slide.
    pub fn key_points(title: impl Into<String>, points: Vec<KeyPoint>) -> Self {
        Slide::KeyPoints {
            title: title.into(),
            points,
            speaker_notes: String::new(),
        }
    }

    /// Creates a section header slide.
    pub fn section_header(title: impl Into<String>) -> Self {
        Slide::SectionHeader {
            title: title.into(),
            subtitle: String::new(),
            speaker_notes: String::new(),
        }
    }

    /// Creates a closing slide.
    pub fn closing(message: impl Into<String>) -> Self {
        Slide::Closing {
            title: default_closing_title(),
            message: message.into(),
            speaker_notes: String::new(),
        }
    }

    /// Returns the variant tag.
    pub fn kind(&self) -> SlideKind {
        match self {
            Slide::Title { .. } => SlideKind::Title,
            Slide::Agenda { .. } => SlideKind::Agenda,
            Slide::Content { .. } => SlideKind::Content,
            Slide::KeyPoints { .. } => SlideKind::KeyPoints,
            Slide::SectionHeader { .. } => SlideKind::SectionHeader,
            Slide::Closing { .. } => SlideKind::Closing,
        }
    }

    /// Returns the slide heading.
    pub fn heading(&self) -> &str {
        match self {
            Slide::Title { title, .. }
            | Slide::Agenda { title, .. }
            | Slide::Content { title, .. }
            | Slide::KeyPoints { title, .. }
            | Slide::SectionHeader { title, .. }
            | Slide::Closing { title, .. } => title,
        }
    }

    /// Returns the presenter notes, empty when none were written.
    pub fn speaker_notes(&self) -> &str {
        match self {
            Slide::Title { speaker_notes, .. }
            | Slide::Agenda { speaker_notes, .. }
            | Slide::Content { speaker_notes, .. }
            | Slide::KeyPoints { speaker_notes, .. }
            | Slide::SectionHeader { speaker_notes, .. }
            | Slide::Closing { speaker_notes, .. } => speaker_notes,
        }
    }

    /// Returns the populated fields as `(name, value)` pairs, in display order.
    ///
    /// Empty optional fields are skipped. List fields are flattened into
    /// one entry per item.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let mut push = |name: &'static str, value: &str| {
            if !value.is_empty() {
                out.push((name, value.to_string()));
            }
        };

        match self {
            Slide::Title {
                title,
                subtitle,
                author,
                date,
                ..
            } => {
                push("title", title);
                push("subtitle", subtitle);
                push("author", author);
                push("date", date);
            }
            Slide::Agenda { title, items, .. } => {
                push("title", title);
                for item in items {
                    push("items", item);
                }
            }
            Slide::Content {
                title,
                body,
                image_suggestion,
                ..
            } => {
                push("title", title);
                push("body", body);
                push("image_suggestion", image_suggestion);
            }
            Slide::KeyPoints { title, points, .. } => {
                push("title", title);
                for point in points {
                    if point.description.is_empty() {
                        push("points", &point.heading);
                    } else {
                        push("points", &format!("{}: {}", point.heading, point.description));
                    }
                }
            }
            Slide::SectionHeader {
                title, subtitle, ..
            } => {
                push("title", title);
                push("subtitle", subtitle);
            }
            Slide::Closing { title, message, .. } => {
                push("title", title);
                push("message", message);
            }
        }

        push("speaker_notes", self.speaker_notes());
        out
    }

    /// Case-insensitive search over every text field of the slide.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.fields()
            .iter()
            .any(|(_, value)| value.to_lowercase().contains(&needle))
    }
}
