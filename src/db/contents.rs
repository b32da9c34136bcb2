use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::content::{ContentItem, ContentKind, ContentPayload};

pub async fn fetch_contents(db: &SqlitePool, module_id: &str) -> Result<Vec<ContentItem>, sqlx::Error> {
    sqlx::query_as::<_, ContentItem>(
        "SELECT id, module_id, content_type, object_id, position \
         FROM contents WHERE module_id = ? ORDER BY position",
    )
    .bind(module_id)
    .fetch_all(db)
    .await
}

pub async fn find_content(db: &SqlitePool, id: &str) -> Result<Option<ContentItem>, sqlx::Error> {
    sqlx::query_as::<_, ContentItem>(
        "SELECT id, module_id, content_type, object_id, position FROM contents WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// The owning user of the course a content item transitively belongs to.
pub async fn content_owner<'e>(
    ex: impl SqliteExecutor<'e>,
    content_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT c.owner_id FROM contents x \
         JOIN modules m ON m.id = x.module_id \
         JOIN courses c ON c.id = m.course_id WHERE x.id = ?",
    )
    .bind(content_id)
    .fetch_optional(ex)
    .await
}

pub async fn insert_content<'e>(
    ex: impl SqliteExecutor<'e>,
    module_id: &str,
    kind: ContentKind,
    object_id: &str,
    position: i64,
) -> Result<ContentItem, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO contents (id, module_id, content_type, object_id, position) VALUES (?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(module_id)
        .bind(kind.as_str())
        .bind(object_id)
        .bind(position)
        .execute(ex)
        .await?;

    Ok(ContentItem {
        id,
        module_id: module_id.to_string(),
        content_type: kind.as_str().to_string(),
        object_id: object_id.to_string(),
        position,
    })
}

pub async fn delete_content<'e>(ex: impl SqliteExecutor<'e>, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM contents WHERE id = ?")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Inserts the typed body row for a payload and returns its id.
pub async fn insert_body<'e>(
    ex: impl SqliteExecutor<'e>,
    owner_id: &str,
    payload: &ContentPayload,
) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let (sql, title, value) = match payload {
        ContentPayload::Text { title, body } => (
            "INSERT INTO texts (id, owner_id, title, created_at, updated_at, body) VALUES (?1, ?2, ?3, ?4, ?4, ?5)",
            title,
            body,
        ),
        ContentPayload::File { title, file } => (
            "INSERT INTO files (id, owner_id, title, created_at, updated_at, file) VALUES (?1, ?2, ?3, ?4, ?4, ?5)",
            title,
            file,
        ),
        ContentPayload::Image { title, file } => (
            "INSERT INTO images (id, owner_id, title, created_at, updated_at, file) VALUES (?1, ?2, ?3, ?4, ?4, ?5)",
            title,
            file,
        ),
        ContentPayload::Video { title, url } => (
            "INSERT INTO videos (id, owner_id, title, created_at, updated_at, url) VALUES (?1, ?2, ?3, ?4, ?4, ?5)",
            title,
            url,
        ),
    };

    sqlx::query(sql)
        .bind(&id)
        .bind(owner_id)
        .bind(title)
        .bind(&now)
        .bind(value)
        .execute(ex)
        .await?;

    Ok(id)
}

pub async fn update_body<'e>(
    ex: impl SqliteExecutor<'e>,
    object_id: &str,
    payload: &ContentPayload,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let (sql, title, value) = match payload {
        ContentPayload::Text { title, body } => {
            ("UPDATE texts SET title = ?, body = ?, updated_at = ? WHERE id = ?", title, body)
        }
        ContentPayload::File { title, file } => {
            ("UPDATE files SET title = ?, file = ?, updated_at = ? WHERE id = ?", title, file)
        }
        ContentPayload::Image { title, file } => {
            ("UPDATE images SET title = ?, file = ?, updated_at = ? WHERE id = ?", title, file)
        }
        ContentPayload::Video { title, url } => {
            ("UPDATE videos SET title = ?, url = ?, updated_at = ? WHERE id = ?", title, url)
        }
    };

    sqlx::query(sql)
        .bind(title)
        .bind(value)
        .bind(&now)
        .bind(object_id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Owner of a typed body row, if it still exists.
pub async fn body_owner<'e>(
    ex: impl SqliteExecutor<'e>,
    kind: ContentKind,
    object_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    let sql = format!("SELECT owner_id FROM {} WHERE id = ?", kind.table());
    sqlx::query_scalar(&sql).bind(object_id).fetch_optional(ex).await
}

pub async fn delete_body<'e>(
    ex: impl SqliteExecutor<'e>,
    kind: ContentKind,
    object_id: &str,
) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
    let result = sqlx::query(&sql).bind(object_id).execute(ex).await?;
    Ok(result.rows_affected())
}

/// Deletes every typed body referenced from one module's content items.
/// Used before the module row itself goes away, since no cascade crosses
/// the polymorphic link.
pub async fn delete_bodies_for_module(
    tx: &mut sqlx::SqliteConnection,
    module_id: &str,
) -> Result<(), sqlx::Error> {
    for kind in crate::content::ALL_KINDS {
        let sql = format!(
            "DELETE FROM {} WHERE id IN (\
             SELECT object_id FROM contents WHERE module_id = ?1 AND content_type = ?2)",
            kind.table()
        );
        sqlx::query(&sql)
            .bind(module_id)
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await?;
    }
    Ok(())
}

/// Same as [`delete_bodies_for_module`], for every module of a course.
pub async fn delete_bodies_for_course(
    tx: &mut sqlx::SqliteConnection,
    course_id: &str,
) -> Result<(), sqlx::Error> {
    for kind in crate::content::ALL_KINDS {
        let sql = format!(
            "DELETE FROM {} WHERE id IN (\
             SELECT x.object_id FROM contents x \
             JOIN modules m ON m.id = x.module_id \
             WHERE m.course_id = ?1 AND x.content_type = ?2)",
            kind.table()
        );
        sqlx::query(&sql)
            .bind(course_id)
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await?;
    }
    Ok(())
}
