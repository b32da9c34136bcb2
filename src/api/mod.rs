mod contents;
mod courses;
mod students;
mod subjects;

use axum::routing::{get, post, put};
use axum::{Router, extract::State, http::StatusCode};

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/subjects", get(subjects::list).post(subjects::create))
        .route("/subjects/{id}", get(subjects::detail))
        .route("/courses", get(courses::list).post(courses::create))
        .route("/courses/mine", get(courses::mine))
        .route(
            "/courses/{id}",
            get(courses::detail).put(courses::update).delete(courses::delete),
        )
        .route("/courses/{id}/modules", put(courses::update_modules))
        .route("/courses/{id}/contents", get(courses::contents))
        .route("/courses/{id}/enroll", post(students::enroll))
        .route("/modules/order", post(contents::reorder_modules))
        .route(
            "/modules/{id}/contents",
            get(contents::list).post(contents::create),
        )
        .route("/contents/order", post(contents::reorder_contents))
        .route("/contents/{id}", put(contents::update).delete(contents::delete))
        .route("/students/register", post(students::register))
        .route("/students/courses", get(students::my_courses))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
