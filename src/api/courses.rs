use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Course, CourseContents, CourseRequest, CourseWithModules, Module, ModuleEntry};
use crate::services::AuthoringService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CourseListParams {
    subject: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CourseListParams>,
) -> Result<Json<Vec<CourseWithModules>>, AppError> {
    let courses = db::courses::fetch_courses(&state.db, params.subject.as_deref()).await?;
    let mut out = Vec::with_capacity(courses.len());
    for course in courses {
        let modules = db::modules::fetch_modules(&state.db, &course.id).await?;
        out.push(CourseWithModules { course, modules });
    }
    Ok(Json(out))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseWithModules>, AppError> {
    let course = db::courses::find_course(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let modules = db::modules::fetch_modules(&state.db, &course.id).await?;
    Ok(Json(CourseWithModules { course, modules }))
}

pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = db::courses::fetch_courses_by_owner(&state.db, &user.id).await?;
    Ok(Json(courses))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let service = AuthoringService::new(state.db.clone());
    let course = service.create_course(&user, &req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CourseRequest>,
) -> Result<Json<Course>, AppError> {
    let service = AuthoringService::new(state.db.clone());
    let course = service.update_course(&user, &id, &req).await?;
    Ok(Json(course))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let service = AuthoringService::new(state.db.clone());
    service.delete_course(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_modules(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(entries): Json<Vec<ModuleEntry>>,
) -> Result<Json<Vec<Module>>, AppError> {
    let service = AuthoringService::new(state.db.clone());
    let modules = service.update_course_modules(&user, &id, &entries).await?;
    Ok(Json(modules))
}

pub async fn contents(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CourseContents>, AppError> {
    let service = AuthoringService::new(state.db.clone());
    let detail = service.course_contents(&user, &id).await?;
    Ok(Json(detail))
}
