//! Checklist results and the parse step that produces them.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

/// Message carried by every [`ChecklistFailure`].
pub const PARSE_FAILURE_MESSAGE: &str = "Could not generate a valid checklist";

/// Outcome of one checklist generation.
///
/// Always exactly one of two shapes. It serializes as either the parsed
/// document itself or `{"error": ..., "raw_response": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChecklistResult {
    /// The model returned valid JSON
    Generated(ChecklistDocument),
    /// The model's text could not be parsed as JSON
    Failed(ChecklistFailure),
}

impl ChecklistResult {
    pub fn is_generated(&self) -> bool {
        matches!(self, ChecklistResult::Generated(_))
    }

    pub fn document(&self) -> Option<&ChecklistDocument> {
        match self {
            ChecklistResult::Generated(doc) => Some(doc),
            ChecklistResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ChecklistFailure> {
        match self {
            ChecklistResult::Generated(_) => None,
            ChecklistResult::Failed(failure) => Some(failure),
        }
    }

    /// The result as 2-space-indented JSON text.
    pub fn to_json_string(&self) -> String {
        match self {
            ChecklistResult::Generated(doc) => doc.pretty().to_string(),
            ChecklistResult::Failed(failure) => format!("{:#}", failure.to_value()),
        }
    }
}

/// A successfully parsed checklist document.
///
/// Holds whatever JSON the model produced, with object keys in the order they
/// arrived, and its pretty-printed form.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistDocument {
    value: Value,
    pretty: String,
}

impl ChecklistDocument {
    pub fn new(value: Value) -> Self {
        let pretty = format!("{:#}", value);
        Self { value, pretty }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The document re-serialized with 2-space indentation.
    pub fn pretty(&self) -> &str {
        &self.pretty
    }

    /// Interpret the document as the five-section [`Checklist`].
    ///
    /// Fails with a JSON error when the model returned valid JSON of a
    /// different shape.
    pub fn checklist(&self) -> Result<Checklist> {
        Ok(Checklist::deserialize(&self.value)?)
    }
}

impl Serialize for ChecklistDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// The error record returned when the model's text is not valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistFailure {
    pub error: String,
    /// The full accumulated response, unmodified
    pub raw_response: String,
    /// What the JSON parser reported
    #[serde(skip)]
    pub reason: String,
}

impl ChecklistFailure {
    pub fn new(raw_response: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            error: PARSE_FAILURE_MESSAGE.to_string(),
            raw_response: raw_response.into(),
            reason: reason.into(),
        }
    }

    fn to_value(&self) -> Value {
        serde_json::json!({
            "error": self.error,
            "raw_response": self.raw_response,
        })
    }
}

/// Typed view of a well-formed checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub introduction: String,
    pub pre_appointment: Vec<String>,
    pub during_appointment: Vec<String>,
    pub post_appointment: Vec<String>,
    pub emotional_support: String,
}

impl Checklist {
    /// Every question across the three question sections, in order.
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.pre_appointment
            .iter()
            .chain(&self.during_appointment)
            .chain(&self.post_appointment)
            .map(String::as_str)
    }
}

/// Parse accumulated model text into a [`ChecklistResult`].
///
/// ```
/// use appointment_checklist::parse_checklist;
///
/// let result = parse_checklist(r#"{"a":1}"#);
/// assert_eq!(result.to_json_string(), "{\n  \"a\": 1\n}");
///
/// let result = parse_checklist("not json");
/// assert_eq!(result.failure().unwrap().raw_response, "not json");
/// ```
pub fn parse_checklist(raw: &str) -> ChecklistResult {
    parse_candidate(raw, raw)
}

/// Like [`parse_checklist`], but first unwraps a Markdown code fence
/// (```` ```json ... ``` ````) if the text is wrapped in one.
///
/// On failure `raw_response` is still the unmodified input.
pub fn parse_fenced_checklist(raw: &str) -> ChecklistResult {
    let candidate = extract_json_from_markdown(raw);
    parse_candidate(&candidate, raw)
}

fn parse_candidate(candidate: &str, raw: &str) -> ChecklistResult {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => {
            debug!("Parsed checklist response as JSON");
            ChecklistResult::Generated(ChecklistDocument::new(value))
        }
        Err(e) => {
            warn!(error = %e, raw_response = %raw, "Error parsing checklist JSON");
            ChecklistResult::Failed(ChecklistFailure::new(raw, e.to_string()))
        }
    }
}

/// Strip a surrounding Markdown code fence, otherwise return the trimmed text.
pub fn extract_json_from_markdown(content: &str) -> String {
    let trimmed = content.trim();

    if trimmed.starts_with("```") {
        if let Some(start_idx) = trimmed.find('\n') {
            let after_start = &trimmed[start_idx + 1..];
            if let Some(end_idx) = after_start.rfind("```") {
                return after_start[..end_idx].trim().to_string();
            }
        }
    }

    trimmed.to_string()
}
