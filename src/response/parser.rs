//! Strict decoding of normalized model output into a [`ResearchResponse`].

use super::ResearchResponse;
use schemars::schema_for;
use serde_json::Value;
use std::sync::OnceLock;

/// Normalized text that does not decode into a [`ResearchResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    pub message: String,
    pub normalized_text: String,
}

impl std::fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SchemaValidationError {}

/// Required top-level fields, read from the generated schema.
fn required_fields() -> &'static [String] {
    static REQUIRED: OnceLock<Vec<String>> = OnceLock::new();
    REQUIRED.get_or_init(|| {
        schema_for!(ResearchResponse)
            .schema
            .object
            .map(|object| object.required.iter().cloned().collect())
            .unwrap_or_default()
    })
}

/// Decode normalized text into a research response.
///
/// Decoding is all-or-nothing: malformed JSON, a non-object value, a missing
/// required field, or a field of the wrong type all fail. Unknown extra fields
/// are ignored.
pub fn parse(normalized: &str) -> Result<ResearchResponse, SchemaValidationError> {
    let invalid = |message: String| SchemaValidationError {
        message,
        normalized_text: normalized.to_string(),
    };

    let value: Value = serde_json::from_str(normalized)
        .map_err(|e| invalid(format!("Invalid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| invalid(format!("Expected a JSON object, found {}", json_kind(&value))))?;

    let missing: Vec<&str> = required_fields()
        .iter()
        .filter(|field| !object.contains_key(field.as_str()))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        return Err(invalid(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value).map_err(|e| invalid(format!("Schema mismatch: {}", e)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
