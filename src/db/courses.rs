use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Course, CourseRequest};

pub async fn fetch_courses(
    db: &SqlitePool,
    subject_slug: Option<&str>,
) -> Result<Vec<Course>, sqlx::Error> {
    match subject_slug {
        Some(slug) => {
            sqlx::query_as::<_, Course>(
                "SELECT c.id, c.owner_id, c.subject_id, c.title, c.slug, c.overview, c.created_at \
                 FROM courses c \
                 JOIN subjects s ON s.id = c.subject_id \
                 WHERE s.slug = ? \
                 ORDER BY c.created_at DESC",
            )
            .bind(slug)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, Course>(
                "SELECT id, owner_id, subject_id, title, slug, overview, created_at \
                 FROM courses ORDER BY created_at DESC",
            )
            .fetch_all(db)
            .await
        }
    }
}

pub async fn fetch_courses_by_owner(db: &SqlitePool, owner_id: &str) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, owner_id, subject_id, title, slug, overview, created_at \
         FROM courses WHERE owner_id = ? ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(db)
    .await
}

pub async fn find_course(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, owner_id, subject_id, title, slug, overview, created_at FROM courses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_course(
    db: &SqlitePool,
    owner_id: &str,
    req: &CourseRequest,
) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO courses (id, owner_id, subject_id, title, slug, overview, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(owner_id)
    .bind(&req.subject_id)
    .bind(&req.title)
    .bind(&req.slug)
    .bind(&req.overview)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Course {
        id,
        owner_id: owner_id.to_string(),
        subject_id: req.subject_id.clone(),
        title: req.title.clone(),
        slug: req.slug.clone(),
        overview: req.overview.clone(),
        created_at: now,
    })
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: &CourseRequest,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE courses SET subject_id = ?, title = ?, slug = ?, overview = ? WHERE id = ?")
        .bind(&req.subject_id)
        .bind(&req.title)
        .bind(&req.slug)
        .bind(&req.overview)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
