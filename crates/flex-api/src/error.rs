//! API error handling
//!
//! Every failure is rendered as `{code, reason, message, location?}`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flex_core::error::FlexError;
use serde::Serialize;

/// An error on its way to the client
#[derive(Debug)]
pub struct ApiError(pub FlexError);

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError(FlexError::unauthorized(msg))
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn body(&self) -> ErrorBody {
        let (message, location) = match &self.0 {
            FlexError::Validation(errors) => match errors.first() {
                Some(first) => (first.message.clone(), Some(first.field.clone())),
                None => ("Validation failed".to_string(), None),
            },
            FlexError::NotFound {
                entity,
                field,
                value,
            } => (format!("{entity} with {field} {value} not found"), None),
            FlexError::Unauthorized { message } | FlexError::Forbidden { message } => {
                (message.clone(), None)
            }
            FlexError::AlreadyApplied { .. } => {
                ("Already applied to this class".to_string(), None)
            }
            FlexError::Database(_) | FlexError::Internal(_) | FlexError::Config(_) => {
                ("Internal server error".to_string(), None)
            }
        };

        ErrorBody {
            code: self.0.status_code(),
            reason: self.0.error_code(),
            message,
            location,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    reason: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl From<FlexError> for ApiError {
    fn from(err: FlexError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(FlexError::invalid("body", rejection.body_text()))
    }
}

/// Unwrap a path parameter, reporting a malformed value against `name`
pub fn path_param<T>(path: Result<Path<T>, PathRejection>, name: &str) -> ApiResult<T> {
    path.map(|Path(value)| value).map_err(|rejection| {
        tracing::debug!(param = name, rejection = %rejection.body_text(), "Bad path parameter");
        ApiError(FlexError::invalid(name, "Must be a numeric id"))
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_server_error() {
            tracing::error!(error = %self.0, reason = self.0.error_code(), "Request failed");
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
