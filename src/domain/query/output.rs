//! Post-processing of raw model output
//!
//! Models are free to append a JSON object to their prose, either between
//! `<<<JSON_START>>>`/`<<<JSON_END>>>` markers, in a fenced `json` block, or bare. When one
//! is found the prose before it becomes the answer; otherwise the whole output is the answer
//! and any `Source N: ...` lines are collected as source snippets.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Longest source snippet kept, in characters
pub const MAX_SOURCE_CHARS: usize = 120;

const JSON_START: &str = "<<<JSON_START>>>";
const JSON_END: &str = "<<<JSON_END>>>";

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```json\s*(\{[\s\S]*?\})\s*```").unwrap());
static SOURCE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Source\s*\d+\s*[:\-]\s*([^\n\r]+)").unwrap());

/// Model output split into its prose answer and optional structured part
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub answer: String,
    pub structured: Option<Value>,
    pub sources: Vec<String>,
}

impl ModelOutput {
    pub fn parse(raw: &str) -> Self {
        let Some((structured, start)) = find_json_object(raw) else {
            return Self {
                answer: raw.trim().to_string(),
                structured: None,
                sources: source_lines(raw),
            };
        };

        let mut answer = raw[..start].trim().to_string();
        if answer.is_empty() {
            answer = structured
                .get("answer")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
        }

        let sources = match structured.get("sources") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => truncate_chars(s, MAX_SOURCE_CHARS),
                    other => truncate_chars(&other.to_string(), MAX_SOURCE_CHARS),
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            answer,
            structured: Some(structured),
            sources,
        }
    }
}

/// First JSON object in `text` and the byte offset where the prose before it ends
fn find_json_object(text: &str) -> Option<(Value, usize)> {
    if let Some(s) = text.find(JSON_START).map(|i| i + JSON_START.len()) {
        if let Some(len) = text[s..].find(JSON_END) {
            let candidate = &text[s..s + len];
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate.trim()) {
                return Some((value, s - JSON_START.len()));
            }
        }
    }

    if let Some(captures) = FENCED_JSON.captures(text) {
        let fence = captures.get(0)?;
        let body = captures.get(1)?;
        if let Ok(value) = serde_json::from_str::<Value>(body.as_str()) {
            return Some((value, fence.start()));
        }
    }

    let first = text.find('{')?;
    let mut stream = serde_json::Deserializer::from_str(&text[first..]).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value @ Value::Object(_))) => Some((value, first)),
        _ => None,
    }
}

fn source_lines(text: &str) -> Vec<String> {
    SOURCE_LINE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| truncate_chars(m.as_str().trim(), MAX_SOURCE_CHARS))
        .collect()
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
