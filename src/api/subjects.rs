use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::auth::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::models::{NewSubjectRequest, Subject, SubjectWithCourseCount};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectWithCourseCount>>, AppError> {
    let subjects = db::subjects::fetch_subjects(&state.db).await?;
    Ok(Json(subjects))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Subject>, AppError> {
    let subject = db::subjects::find_subject(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(subject))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(req): Json<NewSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
    let subject = db::subjects::insert_subject(&state.db, &req)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "subject slug"))?;
    Ok((StatusCode::CREATED, Json(subject)))
}
