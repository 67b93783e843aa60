//! Dashboard handlers: browsing, applying and managing classes

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use flex_core::traits::Id;
use flex_services::ListingFilters;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{path_param, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct AvailableParams {
    #[serde(rename = "type")]
    pub class_type: Option<String>,
    /// Comma-separated weekday names
    pub days: Option<String>,
}

/// GET /api/dashboard/classes/:userId
pub async fn list_available(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<Id>, PathRejection>,
    Query(params): Query<AvailableParams>,
) -> ApiResult<impl IntoResponse> {
    let user_id = path_param(path, "userId")?;
    user.require_self(user_id)?;
    let filters = ListingFilters::parse(params.class_type.as_deref(), params.days.as_deref())?;
    let classes = state.coordinator.list_available(user_id, filters).await?;
    Ok(Json(classes))
}

/// GET /api/dashboard/applied/:userId
pub async fn list_applied(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<Id>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let user_id = path_param(path, "userId")?;
    user.require_self(user_id)?;
    Ok(Json(state.coordinator.list_applied(user_id).await?))
}

/// GET /api/dashboard/studio/:userId
pub async fn list_by_owner(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<Id>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let user_id = path_param(path, "userId")?;
    user.require_self(user_id)?;
    Ok(Json(state.coordinator.list_by_owner(user_id).await?))
}

/// POST /api/dashboard/postClass
pub async fn create_listing(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let class = state.coordinator.create_listing(&user, &body).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// PUT /api/dashboard/class/apply/:classId
pub async fn apply(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<Id>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let class_id = path_param(path, "classId")?;
    let class = state.coordinator.apply(user.id, class_id).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// PUT /api/dashboard/class/withdraw/:classId
pub async fn withdraw(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<Id>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let class_id = path_param(path, "classId")?;
    let class = state.coordinator.withdraw(user.id, class_id).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// PUT /api/dashboard/edit/:classId
pub async fn edit_listing(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<Id>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let class_id = path_param(path, "classId")?;
    let Json(body) = body?;
    let class = state.coordinator.edit_listing(user.id, class_id, &body).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// DELETE /api/dashboard/class/:classId
pub async fn delete_listing(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<Id>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let class_id = path_param(path, "classId")?;
    state.coordinator.delete_listing(user.id, class_id).await?;
    Ok(Json(format!("Class {class_id} deleted")))
}
