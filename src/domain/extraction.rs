//! JSON extraction from model responses.
//!
//! Models asked for JSON still wrap it in prose or markdown fences now and
//! then. The extractor strips control characters, finds the first JSON object
//! (fenced block first, then a balanced `{...}` scan) and parses it.

use serde_json::Value;
use thiserror::Error;

/// Maximum accepted response length (200KB).
pub const MAX_RESPONSE_LENGTH: usize = 200_000;

/// Errors raised while pulling JSON out of a model response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Response is empty")]
    Empty,

    #[error("Response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("No JSON object found in response")]
    NoJson,

    #[error("JSON parse error: {0}")]
    Parse(String),
}

/// Finds and parses the JSON object inside a model response.
#[derive(Debug, Clone, Default)]
pub struct ResponseExtractor;

impl ResponseExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the first JSON object from `response`.
    ///
    /// # Steps
    /// 1. Validate length
    /// 2. Remove control characters (except newlines/tabs)
    /// 3. Locate the JSON text (fenced block or balanced braces)
    /// 4. Parse, requiring an object at the top level
    pub fn extract(&self, response: &str) -> Result<Value, ExtractionError> {
        if response.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        if response.len() > MAX_RESPONSE_LENGTH {
            return Err(ExtractionError::TooLong {
                max: MAX_RESPONSE_LENGTH,
                actual: response.len(),
            });
        }

        let cleaned = remove_control_chars(response);
        let json_text = locate_json(cleaned.trim()).ok_or(ExtractionError::NoJson)?;

        let value: Value =
            serde_json::from_str(json_text).map_err(|e| ExtractionError::Parse(e.to_string()))?;

        if !value.is_object() {
            return Err(ExtractionError::Parse(
                "expected a JSON object at the top level".to_string(),
            ));
        }
        Ok(value)
    }
}

fn remove_control_chars(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect()
}

fn locate_json(s: &str) -> Option<&str> {
    if let Some(fenced) = extract_from_code_block(s) {
        if fenced.starts_with('{') {
            return extract_balanced_object(fenced).or(Some(fenced));
        }
    }
    extract_balanced_object(s)
}

fn extract_from_code_block(s: &str) -> Option<&str> {
    let patterns = ["```json\n", "```json\r\n", "```JSON\n", "```\n", "```\r\n"];

    for pattern in patterns {
        if let Some(start) = s.find(pattern) {
            let body_start = start + pattern.len();
            if let Some(end) = s[body_start..].find("```") {
                return Some(s[body_start..body_start + end].trim());
            }
        }
    }
    None
}

/// Returns the first balanced `{...}` span, ignoring braces inside strings.
fn extract_balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_bare_object() {
        let value = ResponseExtractor::new()
            .extract(r#"{"main_topic": "Project X"}"#)
            .unwrap();
        assert_eq!(value, json!({"main_topic": "Project X"}));
    }

    #[test]
    fn extracts_from_json_fence() {
        let response = "Here is the plan:\n```json\n{\"title\": \"Deck\"}\n```\nLet me know!";
        let value = ResponseExtractor::new().extract(response).unwrap();
        assert_eq!(value["title"], "Deck");
    }

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let response = "Sure! {\"a\": {\"b\": \"}\"}} hope that helps";
        let value = ResponseExtractor::new().extract(response).unwrap();
        assert_eq!(value, json!({"a": {"b": "}"}}));
    }

    #[test]
    fn handles_multibyte_text_before_and_inside_object() {
        let response = "Análisis → {\"main_topic\": \"Migración – €50k\"} ✓";
        let value = ResponseExtractor::new().extract(response).unwrap();
        assert_eq!(value["main_topic"], "Migración – €50k");
    }

    #[test]
    fn strips_control_characters() {
        let response = "{\"main_topic\": \"Pro\u{0007}ject\"}";
        let value = ResponseExtractor::new().extract(response).unwrap();
        assert_eq!(value["main_topic"], "Project");
    }

    #[test]
    fn rejects_empty_response() {
        assert_eq!(ResponseExtractor::new().extract("  \n"), Err(ExtractionError::Empty));
    }

    #[test]
    fn rejects_response_without_object() {
        assert_eq!(
            ResponseExtractor::new().extract("I cannot help with that."),
            Err(ExtractionError::NoJson)
        );
    }

    #[test]
    fn rejects_truncated_object() {
        let result = ResponseExtractor::new().extract("{\"title\": \"Deck\", \"slides\": [");
        assert_eq!(result, Err(ExtractionError::NoJson));
    }

    #[test]
    fn rejects_oversized_response() {
        let long = "a".repeat(MAX_RESPONSE_LENGTH + 1);
        assert!(matches!(
            ResponseExtractor::new().extract(&long),
            Err(ExtractionError::TooLong { .. })
        ));
    }
}
