use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::Course;

/// Adds the enrollment edge. Returns `true` when the user was newly
/// enrolled, `false` when the edge already existed.
pub async fn enroll(db: &SqlitePool, course_id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT OR IGNORE INTO enrollments (course_id, user_id, enrolled_at) VALUES (?, ?, ?)",
    )
    .bind(course_id)
    .bind(user_id)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_enrolled(db: &SqlitePool, course_id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM enrollments WHERE course_id = ? AND user_id = ?",
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(count > 0)
}

pub async fn fetch_enrolled_courses(db: &SqlitePool, user_id: &str) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT c.id, c.owner_id, c.subject_id, c.title, c.slug, c.overview, c.created_at \
         FROM courses c \
         JOIN enrollments e ON e.course_id = c.id \
         WHERE e.user_id = ? \
         ORDER BY c.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
