//! Core error types for Flex API
//!
//! Business-rule and validation failures are reported synchronously; infrastructure
//! failures travel as `Database`/`Internal` and surface as a generic server error.

use thiserror::Error;

use crate::traits::Id;

/// Standard Result type for Flex operations
pub type FlexResult<T> = Result<T, FlexError>;

/// Core error type for all Flex operations
#[derive(Error, Debug)]
pub enum FlexError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("User {user_id} already applied to class {class_id}")]
    AlreadyApplied { user_id: Id, class_id: Id },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FlexError {
    pub fn not_found(entity: &'static str, id: Id) -> Self {
        FlexError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        FlexError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        FlexError::Forbidden {
            message: message.into(),
        }
    }

    /// Single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        FlexError::Validation(errors)
    }

    /// HTTP status code mapping
    pub fn status_code(&self) -> u16 {
        match self {
            FlexError::NotFound { .. } => 404,
            FlexError::Unauthorized { .. } => 401,
            FlexError::Forbidden { .. } => 403,
            FlexError::Validation(_) | FlexError::AlreadyApplied { .. } => 422,
            FlexError::Database(_) | FlexError::Internal(_) | FlexError::Config(_) => 500,
        }
    }

    /// Stable reason string, so clients can special-case `AlreadyApplied`
    pub fn error_code(&self) -> &'static str {
        match self {
            FlexError::NotFound { .. } => "NotFound",
            FlexError::Unauthorized { .. } => "Unauthorized",
            FlexError::Forbidden { .. } => "Forbidden",
            FlexError::Validation(_) => "ValidationError",
            FlexError::AlreadyApplied { .. } => "AlreadyApplied",
            FlexError::Database(_) => "DatabaseError",
            FlexError::Internal(_) => "InternalError",
            FlexError::Config(_) => "ConfigurationError",
        }
    }

    /// Whether the failure came from infrastructure rather than the caller
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// A single field-level failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Validation errors collection, kept in detection order
#[derive(Error, Debug, Default, Clone)]
#[error("{}", self.full_messages().join(", "))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// The first offending field error
    pub fn first(&self) -> Option<&FieldError> {
        self.errors.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect()
    }

    /// `Ok(())` when empty, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
