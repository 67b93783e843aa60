//! Base contract system

use flex_core::error::ValidationErrors;
use serde_json::{Map, Value};

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// A decoded JSON request body
pub type Body = Map<String, Value>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Require the body to be a JSON object
pub fn as_body(value: &Value) -> Result<&Body, ValidationErrors> {
    value.as_object().ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add("body", "must be a JSON object");
        errors
    })
}

/// Record every field absent from the body
pub fn check_present(body: &Body, fields: &[&str], errors: &mut ValidationErrors) {
    for field in fields {
        if !body.contains_key(*field) {
            errors.add(*field, "Missing value in required field");
        }
    }
}

/// Record every present field that is not a JSON string
pub fn check_strings(body: &Body, fields: &[&str], errors: &mut ValidationErrors) {
    for field in fields {
        if body.get(*field).is_some_and(|v| !v.is_string()) {
            errors.add(*field, "Field must be a string");
        }
    }
}

/// Record every present field that is not a JSON number
pub fn check_numbers(body: &Body, fields: &[&str], errors: &mut ValidationErrors) {
    for field in fields {
        if body.get(*field).is_some_and(|v| !v.is_number()) {
            errors.add(*field, "Field must be a number");
        }
    }
}

/// Record every numeric field that is zero or negative
pub fn check_positive(body: &Body, fields: &[&str], errors: &mut ValidationErrors) {
    for field in fields {
        if let Some(n) = body.get(*field).and_then(Value::as_f64) {
            if n <= 0.0 {
                errors.add(*field, "Field must be greater than 0");
            }
        }
    }
}

/// String value of a field already checked by `check_strings`
pub fn string_field<'a>(body: &'a Body, field: &str) -> &'a str {
    body.get(field).and_then(Value::as_str).unwrap_or_default()
}
