use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::models::Module;

pub async fn fetch_modules(db: &SqlitePool, course_id: &str) -> Result<Vec<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(
        "SELECT id, course_id, title, description, position \
         FROM modules WHERE course_id = ? ORDER BY position",
    )
    .bind(course_id)
    .fetch_all(db)
    .await
}

pub async fn find_module(db: &SqlitePool, id: &str) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(
        "SELECT id, course_id, title, description, position FROM modules WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// The owning user of the course a module belongs to.
pub async fn module_owner<'e>(
    ex: impl SqliteExecutor<'e>,
    module_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT c.owner_id FROM modules m JOIN courses c ON c.id = m.course_id WHERE m.id = ?",
    )
    .bind(module_id)
    .fetch_optional(ex)
    .await
}

pub async fn insert_module<'e>(
    ex: impl SqliteExecutor<'e>,
    course_id: &str,
    title: &str,
    description: &str,
    position: i64,
) -> Result<Module, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO modules (id, course_id, title, description, position) VALUES (?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(course_id)
        .bind(title)
        .bind(description)
        .bind(position)
        .execute(ex)
        .await?;

    Ok(Module {
        id,
        course_id: course_id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        position,
    })
}

pub async fn update_module<'e>(
    ex: impl SqliteExecutor<'e>,
    id: &str,
    title: &str,
    description: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE modules SET title = ?, description = ? WHERE id = ?")
        .bind(title)
        .bind(description)
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn delete_module<'e>(ex: impl SqliteExecutor<'e>, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM modules WHERE id = ?")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}
