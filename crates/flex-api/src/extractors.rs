//! Axum extractors for API handlers

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use flex_auth::{extract_bearer_token, CurrentUser, JwtError, JwtService};
use flex_services::{AccountService, ApplicationCoordinator};
use std::sync::Arc;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: ApplicationCoordinator,
    pub accounts: AccountService,
    pub jwt: Arc<JwtService>,
}

/// Caller identity from `Authorization: Bearer <jwt>`
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let claims = app_state.jwt.validate_token(token).map_err(|e| match e {
            JwtError::Expired => ApiError::unauthorized("Token expired"),
            _ => ApiError::unauthorized("Invalid token"),
        })?;

        let user =
            CurrentUser::from_claims(&claims).map_err(|_| ApiError::unauthorized("Invalid token"))?;
        Ok(AuthenticatedUser(user))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
