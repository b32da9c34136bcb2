use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::auth::CurrentUser;
use crate::content::{ContentEntry, ContentItem, ContentPayload};
use crate::error::AppError;
use crate::ordering;
use crate::services::AuthoringService;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(module_id): Path<String>,
) -> Result<Json<Vec<ContentEntry>>, AppError> {
    let service = AuthoringService::new(state.db.clone());
    let entries = service.list_module_contents(&user, &module_id).await?;
    Ok(Json(entries))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(module_id): Path<String>,
    Json(payload): Json<ContentPayload>,
) -> Result<(StatusCode, Json<ContentItem>), AppError> {
    let service = AuthoringService::new(state.db.clone());
    let item = service.create_content(&user, &module_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ContentPayload>,
) -> Result<Json<ContentItem>, AppError> {
    let service = AuthoringService::new(state.db.clone());
    let item = service.update_content(&user, &id, &payload).await?;
    Ok(Json(item))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let service = AuthoringService::new(state.db.clone());
    service.delete_content(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_modules(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mapping): Json<HashMap<String, i64>>,
) -> Result<StatusCode, AppError> {
    ordering::reorder(&state.db, &ordering::MODULES, &user.id, &mapping).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_contents(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mapping): Json<HashMap<String, i64>>,
) -> Result<StatusCode, AppError> {
    ordering::reorder(&state.db, &ordering::CONTENTS, &user.id, &mapping).await?;
    Ok(StatusCode::NO_CONTENT)
}
