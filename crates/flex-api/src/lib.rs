//! # flex-api
//!
//! REST handlers for Flex API.
//!
//! Routes live under `/api/user` (accounts) and `/api/dashboard` (classes).
//! Every dashboard route requires a bearer token.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::{AppState, AuthenticatedUser};
pub use routes::router;
