//! JSON extraction from engine answers
//!
//! Engines are asked for a bare JSON object but often wrap it in a Markdown
//! fence or surround it with prose. Extraction tries, in order:
//!
//! 1. the whole answer (after trimming whitespace and a BOM),
//! 2. the body of a fenced block (```json ... ``` or ``` ... ```),
//! 3. the first `{` in the text at which a complete JSON object parses.
//!
//! Nothing is repaired: a truncated or malformed object is rejected, never
//! completed by guesswork.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

use crate::types::{ContractError, ContractViolation, Result, ViolationKind};

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)```").expect("fence pattern is a valid regex")
});

/// Where in the answer the object was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// The whole answer was the object
    Direct,
    /// Body of a fenced code block
    Fenced,
    /// Embedded in surrounding prose
    Embedded,
}

/// Extract the JSON object from an engine answer
pub fn extract_json_object(text: &str) -> Result<Value> {
    JsonExtractor::new()
        .extract(text)
        .map(|(value, _)| Value::Object(value))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExtractor;

impl JsonExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Returns the object and where it was found
    pub fn extract(&self, text: &str) -> Result<(Map<String, Value>, ExtractionSource)> {
        let cleaned = text.trim().trim_start_matches('\u{feff}').trim();

        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(cleaned) {
            return Ok((map, ExtractionSource::Direct));
        }

        for caps in FENCE.captures_iter(cleaned) {
            if let Some(body) = caps.get(1)
                && let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body.as_str().trim())
            {
                debug!("JSON object extracted from fenced block");
                return Ok((map, ExtractionSource::Fenced));
            }
        }

        if let Some(map) = first_embedded_object(cleaned) {
            debug!("JSON object extracted from surrounding text");
            return Ok((map, ExtractionSource::Embedded));
        }

        Err(ContractError::single(
            ContractViolation::new(
                ViolationKind::Extraction,
                format!(
                    "no well-formed JSON object in engine answer. Content preview: {}...",
                    preview(cleaned)
                ),
            ),
        )
        .into())
    }
}

/// Try every `{` position until one starts a complete object
fn first_embedded_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
