//! # Model Response Contract
//!
//! Strict validation of the structured output returned by the generative
//! text service. A [`ModelResponse`] only exists if the payload carried a
//! non-empty `antenna_type`, a non-empty list of positive `frequencies_hz`
//! and a non-empty list of `tasks`. Anything else is a terminal error for
//! the request: there is no retry, no default and no partial result.

use crate::error::{self, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

/// One opaque unit of downstream modelling work.
///
/// The schema of a task is owned by the model prompt and the CAD manager;
/// the contract only requires each entry to be a JSON object.
pub type Task = Map<String, Value>;

pub const ANTENNA_TYPE: &str = "antenna_type";
pub const FREQUENCIES_HZ: &str = "frequencies_hz";
pub const TASKS: &str = "tasks";
pub const NOTES: &str = "notes";

/// Raw candidate payload as handed over by the provider client
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Unparsed text claimed to be JSON
    Text(String),
    /// Already-parsed JSON value
    Value(Value),
}

impl From<String> for RawResponse {
    fn from(text: String) -> Self {
        RawResponse::Text(text)
    }
}

impl From<&str> for RawResponse {
    fn from(text: &str) -> Self {
        RawResponse::Text(text.to_string())
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        RawResponse::Value(value)
    }
}

/// Validated model output. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelResponse {
    antenna_type: String,
    frequencies_hz: Vec<f64>,
    tasks: Vec<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl ModelResponse {
    /// Validate a raw payload, text or parsed
    pub fn validate(raw: impl Into<RawResponse>) -> Result<Self> {
        match raw.into() {
            RawResponse::Text(text) => Self::from_text(&text),
            RawResponse::Value(value) => Self::from_value(&value),
        }
    }

    /// Parse `text` as JSON, then validate it
    pub fn from_text(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            error::malformed_response(format!("payload is not valid JSON: {}", e))
                .with_operation("response::parse")
                .set_source(e)
        })?;
        Self::from_value(&value)
    }

    /// Validate a model reply that may wrap its JSON in prose or a fence.
    ///
    /// Text that already parses as JSON is validated as is, so a top-level
    /// array stays malformed and string values are never cut. Only text that
    /// fails to parse goes through [`extract_json_object`].
    pub fn from_reply(content: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(content) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::from_text(extract_json_object(content)),
        }
    }

    /// Validate an already-parsed JSON value
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            error::malformed_response(format!(
                "expected a JSON object at top level, found {}",
                json_type(value)
            ))
            .with_operation("response::validate")
        })?;

        let response = Self {
            antenna_type: antenna_type(obj)?,
            frequencies_hz: frequencies(obj)?,
            tasks: tasks(obj)?,
            notes: obj.get(NOTES).and_then(Value::as_str).map(str::to_string),
        };
        Ok(response)
    }

    pub fn antenna_type(&self) -> &str {
        &self.antenna_type
    }

    pub fn frequencies_hz(&self) -> &[f64] {
        &self.frequencies_hz
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Render back to the JSON shape the model was asked for
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl FromStr for ModelResponse {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

impl TryFrom<&Value> for ModelResponse {
    type Error = error::Error;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_value(value)
    }
}

/// Treats an explicit `null` the same as an absent key.
fn present<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn antenna_type(obj: &Map<String, Value>) -> Result<String> {
    match present(obj, ANTENNA_TYPE) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(missing(ANTENNA_TYPE)),
    }
}

fn frequencies(obj: &Map<String, Value>) -> Result<Vec<f64>> {
    let value = present(obj, FREQUENCIES_HZ).ok_or_else(|| missing(FREQUENCIES_HZ))?;

    let items = value.as_array().ok_or_else(|| {
        invalid(
            FREQUENCIES_HZ,
            format!("expected an array of numbers, found {}", json_type(value)),
        )
    })?;

    if items.is_empty() {
        return Err(invalid(FREQUENCIES_HZ, "empty"));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let f = item.as_f64().ok_or_else(|| {
                invalid(
                    FREQUENCIES_HZ,
                    format!("non-numeric entry at index {} ({})", i, json_type(item)),
                )
            })?;
            if !f.is_finite() || f <= 0.0 {
                return Err(invalid(
                    FREQUENCIES_HZ,
                    format!("non-positive entry at index {} ({})", i, f),
                ));
            }
            Ok(f)
        })
        .collect()
}

fn tasks(obj: &Map<String, Value>) -> Result<Vec<Task>> {
    let items = match present(obj, TASKS) {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(missing(TASKS)),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(task) => Ok(task.clone()),
            other => Err(invalid(
                TASKS,
                format!("entry at index {} is {}, expected an object", i, json_type(other)),
            )),
        })
        .collect()
}

fn missing(field: &'static str) -> error::Error {
    error::missing_field(field).with_operation("response::validate")
}

fn invalid(field: &'static str, reason: impl Into<String>) -> error::Error {
    error::invalid_value(field, reason).with_operation("response::validate")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Locate the JSON object inside raw model text that did not parse.
///
/// Strips a markdown code fence when present, otherwise slices from the first
/// `{` to the last `}`. Text without braces is returned trimmed so that the
/// validator reports it as malformed. Never invents content.
pub fn extract_json_object(content: &str) -> &str {
    if let Some(rest) = content.split("```json").nth(1) {
        return rest.split("```").next().map(str::trim).unwrap_or(content);
    }
    if content.contains("```") {
        if let Some(inner) = content.split("```").nth(1) {
            return inner.trim();
        }
    }

    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => &content[start..=end],
        _ => content.trim(),
    }
}
