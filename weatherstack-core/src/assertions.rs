//! Checks applied to responses and decoded payloads.
//!
//! Each function is independent and stateless. A passing check returns
//! `Ok(())`; a failing one returns an [`AssertionError`] whose message carries
//! the expected and actual values, ready to be surfaced as a test failure.

use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::{model::ApiResponse, schema::Schema};

#[derive(Debug, Error, PartialEq)]
pub enum AssertionError {
    #[error("Expected status code {expected}, but got {actual}. Response: {body}")]
    StatusCode { expected: u16, actual: u16, body: String },

    #[error("Header '{name}' not found in response headers.")]
    HeaderMissing { name: String },

    #[error("Header '{name}' expected '{expected}', but got '{actual}'.")]
    HeaderMismatch { name: String, expected: String, actual: String },

    #[error("JSON schema validation failed: {message} at {path} ({violations} violation(s))")]
    SchemaViolation { path: String, message: String, violations: usize },

    #[error("Schema '{schema}' could not be compiled: {reason}")]
    InvalidSchema { schema: String, reason: String },

    #[error("Field '{field}' is missing or null.")]
    FieldMissing { field: String },

    #[error("Field '{field}' expected type {expected}, but got {actual}.")]
    FieldType { field: String, expected: JsonType, actual: JsonType },

    #[error("Field '{field}' expected value '{expected}', but got '{actual}'.")]
    FieldValue { field: String, expected: Value, actual: Value },

    #[error("Field '{field}' does not contain expected value '{expected}'. Actual value: '{actual}'.")]
    FieldNotContained { field: String, expected: Value, actual: Value },
}

/// Runtime type of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Null,
    Boolean,
    /// Integral number. Matched by [`JsonType::Number`] too.
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonType::Integer,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        let actual = Self::of(value);
        actual == *self || (*self == JsonType::Number && actual == JsonType::Integer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type AssertResult = Result<(), AssertionError>;

pub fn assert_status_code(response: &ApiResponse, expected: u16) -> AssertResult {
    let actual = response.status_code();
    debug!("Asserting status code: Expected {expected}, Got {actual}");

    if actual != expected {
        return Err(AssertionError::StatusCode { expected, actual, body: response.body.clone() });
    }
    Ok(())
}

/// Header names match case-insensitively, values exactly.
pub fn assert_header_value(response: &ApiResponse, name: &str, expected: &str) -> AssertResult {
    debug!("Asserting header '{name}': Expected '{expected}'");

    let actual = response
        .header(name)
        .ok_or_else(|| AssertionError::HeaderMissing { name: name.to_string() })?;

    if actual != expected {
        return Err(AssertionError::HeaderMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Validate `body` against one of the registered schemas.
pub fn validate_schema(body: &Value, schema: Schema) -> AssertResult {
    debug!(schema = schema.name(), "Validating JSON schema...");
    validate_against_schema(body, schema.definition())
}

/// Validate `body` against an arbitrary schema document. The first violation
/// is reported along with the total count.
pub fn validate_against_schema(body: &Value, schema: &Value) -> AssertResult {
    let validator = jsonschema::validator_for(schema).map_err(|e| AssertionError::InvalidSchema {
        schema: schema_label(schema),
        reason: e.to_string(),
    })?;

    let errors: Vec<(String, String)> = validator
        .iter_errors(body)
        .map(|e| (e.instance_path.to_string(), e.to_string()))
        .collect();

    match errors.first() {
        None => {
            info!("JSON schema validation successful.");
            Ok(())
        }
        Some((path, message)) => Err(AssertionError::SchemaViolation {
            path: if path.is_empty() { "(root)".to_string() } else { path.clone() },
            message: message.clone(),
            violations: errors.len(),
        }),
    }
}

fn schema_label(schema: &Value) -> String {
    schema
        .get("$id")
        .or_else(|| schema.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("<anonymous>")
        .to_string()
}

static NULL: Value = Value::Null;

fn field_value<'a>(obj: &'a Value, field: &str) -> &'a Value {
    obj.get(field).unwrap_or(&NULL)
}

/// Fails if `field` is absent or `null`.
pub fn assert_field_exists(obj: &Value, field: &str) -> AssertResult {
    debug!("Asserting field '{field}' exists in JSON.");

    if field_value(obj, field).is_null() {
        return Err(AssertionError::FieldMissing { field: field.to_string() });
    }
    Ok(())
}

pub fn assert_field_type(obj: &Value, field: &str, expected: JsonType) -> AssertResult {
    debug!("Asserting field '{field}' type: Expected {expected}");

    let value = field_value(obj, field);
    if !expected.matches(value) {
        return Err(AssertionError::FieldType {
            field: field.to_string(),
            expected,
            actual: JsonType::of(value),
        });
    }
    Ok(())
}

/// Exact JSON equality. An absent field compares as `null`.
pub fn assert_field_equals(obj: &Value, field: &str, expected: impl Into<Value>) -> AssertResult {
    let expected = expected.into();
    debug!("Asserting field '{field}' value: Expected '{expected}'");

    let actual = field_value(obj, field);
    if *actual != expected {
        return Err(AssertionError::FieldValue {
            field: field.to_string(),
            expected,
            actual: actual.clone(),
        });
    }
    Ok(())
}

/// Substring check for strings, membership for arrays, key lookup for objects.
pub fn assert_field_contains(obj: &Value, field: &str, needle: impl Into<Value>) -> AssertResult {
    let needle = needle.into();
    debug!("Asserting field '{field}' contains: Expected '{needle}'");

    let actual = field_value(obj, field);
    let contained = match (actual, &needle) {
        (Value::Null, _) => {
            return Err(AssertionError::FieldMissing { field: field.to_string() });
        }
        (Value::String(haystack), Value::String(n)) => haystack.contains(n.as_str()),
        (Value::Array(items), n) => items.contains(n),
        (Value::Object(map), Value::String(key)) => map.contains_key(key),
        _ => false,
    };

    if !contained {
        return Err(AssertionError::FieldNotContained {
            field: field.to_string(),
            expected: needle,
            actual: actual.clone(),
        });
    }
    Ok(())
}
