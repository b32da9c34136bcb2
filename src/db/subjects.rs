use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{NewSubjectRequest, Subject, SubjectWithCourseCount};

pub async fn fetch_subjects(db: &SqlitePool) -> Result<Vec<SubjectWithCourseCount>, sqlx::Error> {
    sqlx::query_as::<_, SubjectWithCourseCount>(
        "SELECT s.id, s.title, s.slug, COUNT(c.id) AS course_count \
         FROM subjects s \
         LEFT JOIN courses c ON c.subject_id = s.id \
         GROUP BY s.id \
         ORDER BY s.title",
    )
    .fetch_all(db)
    .await
}

pub async fn find_subject(db: &SqlitePool, id: &str) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>("SELECT id, title, slug FROM subjects WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_subject_by_slug(db: &SqlitePool, slug: &str) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>("SELECT id, title, slug FROM subjects WHERE slug = ?")
        .bind(slug)
        .fetch_optional(db)
        .await
}

pub async fn insert_subject(db: &SqlitePool, req: &NewSubjectRequest) -> Result<Subject, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO subjects (id, title, slug) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(&req.title)
        .bind(&req.slug)
        .execute(db)
        .await?;

    Ok(Subject {
        id,
        title: req.title.clone(),
        slug: req.slug.clone(),
    })
}
