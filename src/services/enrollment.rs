use sqlx::SqlitePool;
use tracing::info;

use crate::db;
use crate::error::AppError;
use crate::models::{Course, User};

#[derive(Debug, PartialEq, Eq)]
pub enum EnrollStatus {
    Enrolled,
    AlreadyEnrolled,
}

/// Whether a user may see a course's full content: its owner, or anyone
/// enrolled. Course metadata stays public either way.
pub async fn can_view(db: &SqlitePool, course: &Course, user: &User) -> Result<bool, sqlx::Error> {
    if course.owner_id == user.id {
        return Ok(true);
    }
    db::enrollments::is_enrolled(db, &course.id, &user.id).await
}

pub struct EnrollmentService {
    db: SqlitePool,
}

impl EnrollmentService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Idempotent: enrolling twice keeps a single edge and reports the
    /// repeat distinctly instead of failing.
    pub async fn enroll(&self, actor: &User, course_id: &str) -> Result<EnrollStatus, AppError> {
        let course = db::courses::find_course(&self.db, course_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if db::enrollments::enroll(&self.db, &course.id, &actor.id).await? {
            info!("user {} enrolled in course {}", actor.username, course.slug);
            Ok(EnrollStatus::Enrolled)
        } else {
            Ok(EnrollStatus::AlreadyEnrolled)
        }
    }

    pub async fn my_courses(&self, actor: &User) -> Result<Vec<Course>, AppError> {
        Ok(db::enrollments::fetch_enrolled_courses(&self.db, &actor.id).await?)
    }

    pub async fn ensure_can_view(&self, course: &Course, user: &User) -> Result<(), AppError> {
        if can_view(&self.db, course, user).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}
