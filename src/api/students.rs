use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::auth::CurrentUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Course, NewUserRequest, RegisteredUser};
use crate::services::{EnrollStatus, EnrollmentService};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<RegisteredUser>), AppError> {
    if req.username.trim().is_empty() {
        return Err(AppError::Validation("username must not be empty".to_string()));
    }

    let user = db::users::insert_user(&state.db, req.username.trim())
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "username"))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            id: user.id,
            username: user.username,
            api_token: user.api_token,
        }),
    ))
}

pub async fn enroll(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = EnrollmentService::new(state.db.clone());
    let body = match service.enroll(&user, &course_id).await? {
        EnrollStatus::Enrolled => serde_json::json!({"enrolled": true}),
        EnrollStatus::AlreadyEnrolled => serde_json::json!({"already_enrolled": true}),
    };
    Ok(Json(body))
}

pub async fn my_courses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Course>>, AppError> {
    let service = EnrollmentService::new(state.db.clone());
    let courses = service.my_courses(&user).await?;
    Ok(Json(courses))
}
