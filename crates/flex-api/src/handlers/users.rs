//! Account handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// POST /api/user/signup
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let response = state.accounts.signup(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    Ok(Json(state.accounts.login(&body).await?))
}

/// POST /api/user/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.accounts.refresh(&user).await?))
}
