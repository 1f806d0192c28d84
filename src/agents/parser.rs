//! Parse-with-fallback for LLM output
//!
//! Every flow asks the model for JSON and gets back whatever the model felt
//! like producing. A [`ResponseShape`] describes one expected payload: how to
//! validate parsed JSON, how to salvage free text, and what to return when
//! nothing usable came back. [`parse_with_fallback`] is the one strategy that
//! drives all of them.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Where a generated payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Llm,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Generated<T> {
    pub output: T,
    pub source: ContentSource,
}

impl<T> Generated<T> {
    pub fn is_fallback(&self) -> bool {
        self.source == ContentSource::Fallback
    }
}

pub trait ResponseShape {
    type Output;

    fn name(&self) -> &'static str;

    /// Convert parsed JSON into the output, or `None` if it is unusable.
    fn validate(&self, value: Value) -> Option<Self::Output>;

    /// Lenient path for text that is not valid JSON.
    fn salvage(&self, _text: &str) -> Option<Self::Output> {
        None
    }

    /// Deterministic content used when the model gave nothing usable.
    fn fallback(&self) -> Self::Output;
}

/// Trim and remove a leading ```` ```json ```` / ```` ``` ```` and a trailing ```` ``` ````.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse `text` as JSON, retrying on the outermost `{...}` span when the model
/// wrapped the object in prose.
fn parse_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

pub fn parse_with_fallback<S: ResponseShape>(raw: &str, shape: &S) -> Generated<S::Output> {
    let text = strip_code_fences(raw);

    if text.is_empty() {
        warn!(shape = shape.name(), "Empty LLM output, using fallback content");
        return Generated {
            output: shape.fallback(),
            source: ContentSource::Fallback,
        };
    }

    if let Some(output) = parse_json(text).and_then(|value| shape.validate(value)) {
        return Generated {
            output,
            source: ContentSource::Llm,
        };
    }

    if let Some(output) = shape.salvage(text) {
        debug!(shape = shape.name(), "Salvaged non-JSON LLM output");
        return Generated {
            output,
            source: ContentSource::Llm,
        };
    }

    let preview: String = text.chars().take(200).collect();
    warn!(
        shape = shape.name(),
        raw = %preview,
        "LLM output failed validation, using fallback content"
    );
    Generated {
        output: shape.fallback(),
        source: ContentSource::Fallback,
    }
}

/// String items of a JSON array, trimmed, empties dropped.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The first `n` characters of `text`.
pub(crate) fn prefix_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
