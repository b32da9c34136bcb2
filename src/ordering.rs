//! Position assignment for ordered children of a parent row.
//!
//! Modules are ordered within their course and content items within their
//! module. New rows take `max(sibling position) + 1`, starting at 0. The
//! sibling read and the dependent insert must share one write transaction
//! (`BEGIN IMMEDIATE`), otherwise two concurrent creations can read the same
//! maximum and assign duplicate positions.

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::AppError;

/// A per-parent ordering scope: which table is ordered, which column scopes
/// the siblings, and how a row resolves to the owning user through its
/// course.
pub struct OrderScope {
    pub table: &'static str,
    pub parent_column: &'static str,
    owner_sql: &'static str,
}

/// Modules ordered within a course.
pub static MODULES: OrderScope = OrderScope {
    table: "modules",
    parent_column: "course_id",
    owner_sql: "SELECT c.owner_id FROM modules m \
                JOIN courses c ON c.id = m.course_id WHERE m.id = ?",
};

/// Content items ordered within a module.
pub static CONTENTS: OrderScope = OrderScope {
    table: "contents",
    parent_column: "module_id",
    owner_sql: "SELECT c.owner_id FROM contents x \
                JOIN modules m ON m.id = x.module_id \
                JOIN courses c ON c.id = m.course_id WHERE x.id = ?",
};

/// Next position under `parent_id`: 0 when the parent has no children yet,
/// otherwise one past the current maximum.
///
/// Callers must pass the connection of a transaction opened with
/// `BEGIN IMMEDIATE` and perform the insert on that same transaction.
pub async fn next_position(
    conn: &mut SqliteConnection,
    scope: &OrderScope,
    parent_id: &str,
) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM {} WHERE {} = ?",
        scope.table, scope.parent_column
    );
    sqlx::query_scalar(&sql).bind(parent_id).fetch_one(conn).await
}

/// Applies a bulk `{id -> position}` mapping in one transaction.
///
/// Every id is checked before the first write: an unknown id fails NotFound
/// and an id whose course belongs to someone else fails Forbidden, in both
/// cases leaving every row untouched. Values are applied verbatim; position
/// is a sort key, so gaps and duplicates are accepted.
pub async fn reorder(
    db: &SqlitePool,
    scope: &OrderScope,
    owner_id: &str,
    mapping: &HashMap<String, i64>,
) -> Result<(), AppError> {
    if mapping.is_empty() {
        return Ok(());
    }

    let mut tx = db.begin_with("BEGIN IMMEDIATE").await?;

    for id in mapping.keys() {
        let owner: Option<String> = sqlx::query_scalar(scope.owner_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        match owner.as_deref() {
            None => return Err(AppError::NotFound),
            Some(o) if o != owner_id => return Err(AppError::Forbidden),
            Some(_) => {}
        }
    }

    let sql = format!("UPDATE {} SET position = ? WHERE id = ?", scope.table);
    for (id, position) in mapping {
        sqlx::query(&sql)
            .bind(position)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        // Single connection so every query sees the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    async fn seed_user(db: &SqlitePool, id: &str) {
        sqlx::query("INSERT INTO users (id, username, api_token, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(format!("user-{id}"))
            .bind(format!("token-{id}"))
            .bind("2025-07-12T00:00:00Z")
            .execute(db)
            .await
            .expect("Failed to seed user");
    }

    async fn seed_course(db: &SqlitePool, id: &str, owner_id: &str) {
        sqlx::query("INSERT OR IGNORE INTO subjects (id, title, slug) VALUES ('s1', 'Math', 'math')")
            .execute(db)
            .await
            .expect("Failed to seed subject");
        sqlx::query(
            "INSERT INTO courses (id, owner_id, subject_id, title, slug, overview, created_at) \
             VALUES (?, ?, 's1', ?, ?, '', '2025-07-12T00:00:00Z')",
        )
        .bind(id)
        .bind(owner_id)
        .bind(format!("Course {id}"))
        .bind(format!("course-{id}"))
        .execute(db)
        .await
        .expect("Failed to seed course");
    }

    async fn insert_module(db: &SqlitePool, id: &str, course_id: &str) -> i64 {
        let mut tx = db.begin_with("BEGIN IMMEDIATE").await.expect("begin");
        let position = next_position(&mut *tx, &MODULES, course_id)
            .await
            .expect("next_position");
        sqlx::query("INSERT INTO modules (id, course_id, title, description, position) VALUES (?, ?, ?, '', ?)")
            .bind(id)
            .bind(course_id)
            .bind(format!("Module {id}"))
            .bind(position)
            .execute(&mut *tx)
            .await
            .expect("insert module");
        tx.commit().await.expect("commit");
        position
    }

    async fn positions(db: &SqlitePool, course_id: &str) -> Vec<(String, i64)> {
        sqlx::query_as(
            "SELECT id, position FROM modules WHERE course_id = ? ORDER BY position, id",
        )
        .bind(course_id)
        .fetch_all(db)
        .await
        .expect("fetch positions")
    }

    #[tokio::test]
    async fn test_first_child_gets_zero() {
        let db = setup_test_db().await;
        seed_user(&db, "u1").await;
        seed_course(&db, "c1", "u1").await;

        assert_eq!(insert_module(&db, "m1", "c1").await, 0);
    }

    #[tokio::test]
    async fn test_sequential_assignment_is_dense() {
        let db = setup_test_db().await;
        seed_user(&db, "u1").await;
        seed_course(&db, "c1", "u1").await;

        for (i, id) in ["m1", "m2", "m3", "m4"].iter().enumerate() {
            assert_eq!(insert_module(&db, id, "c1").await, i as i64);
        }
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let db = setup_test_db().await;
        seed_user(&db, "u1").await;
        seed_course(&db, "c1", "u1").await;
        seed_course(&db, "c2", "u1").await;

        assert_eq!(insert_module(&db, "m1", "c1").await, 0);
        assert_eq!(insert_module(&db, "m2", "c1").await, 1);
        // A different course starts over at 0.
        assert_eq!(insert_module(&db, "m3", "c2").await, 0);
    }

    #[tokio::test]
    async fn test_reorder_applies_mapping() {
        let db = setup_test_db().await;
        seed_user(&db, "u1").await;
        seed_course(&db, "c1", "u1").await;
        insert_module(&db, "m1", "c1").await;
        insert_module(&db, "m2", "c1").await;

        let mapping = HashMap::from([("m1".to_string(), 5_i64), ("m2".to_string(), 2_i64)]);
        reorder(&db, &MODULES, "u1", &mapping).await.expect("reorder");

        assert_eq!(
            positions(&db, "c1").await,
            vec![("m2".to_string(), 2), ("m1".to_string(), 5)]
        );
    }

    #[tokio::test]
    async fn test_reorder_is_idempotent() {
        let db = setup_test_db().await;
        seed_user(&db, "u1").await;
        seed_course(&db, "c1", "u1").await;
        insert_module(&db, "m1", "c1").await;
        insert_module(&db, "m2", "c1").await;

        let mapping = HashMap::from([("m1".to_string(), 1_i64), ("m2".to_string(), 0_i64)]);
        reorder(&db, &MODULES, "u1", &mapping).await.expect("first");
        let once = positions(&db, "c1").await;
        reorder(&db, &MODULES, "u1", &mapping).await.expect("second");
        assert_eq!(positions(&db, "c1").await, once);
    }

    #[tokio::test]
    async fn test_reorder_rejects_foreign_rows_atomically() {
        let db = setup_test_db().await;
        seed_user(&db, "u1").await;
        seed_user(&db, "u2").await;
        seed_course(&db, "c1", "u1").await;
        seed_course(&db, "c2", "u2").await;
        insert_module(&db, "m1", "c1").await;
        insert_module(&db, "theirs", "c2").await;

        let mapping = HashMap::from([("m1".to_string(), 9_i64), ("theirs".to_string(), 9_i64)]);
        let err = reorder(&db, &MODULES, "u1", &mapping).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        // Nothing was applied, including the row the caller does own.
        assert_eq!(positions(&db, "c1").await, vec![("m1".to_string(), 0)]);
        assert_eq!(positions(&db, "c2").await, vec![("theirs".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_reorder_unknown_id_is_not_found() {
        let db = setup_test_db().await;
        seed_user(&db, "u1").await;
        seed_course(&db, "c1", "u1").await;
        insert_module(&db, "m1", "c1").await;

        let mapping = HashMap::from([("m1".to_string(), 3_i64), ("ghost".to_string(), 0_i64)]);
        let err = reorder(&db, &MODULES, "u1", &mapping).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
        assert_eq!(positions(&db, "c1").await, vec![("m1".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_reorder_accepts_duplicate_positions() {
        let db = setup_test_db().await;
        seed_user(&db, "u1").await;
        seed_course(&db, "c1", "u1").await;
        insert_module(&db, "m1", "c1").await;
        insert_module(&db, "m2", "c1").await;

        let mapping = HashMap::from([("m1".to_string(), 7_i64), ("m2".to_string(), 7_i64)]);
        reorder(&db, &MODULES, "u1", &mapping).await.expect("reorder");

        let rows = positions(&db, "c1").await;
        assert_eq!(rows[0].1, 7);
        assert_eq!(rows[1].1, 7);
    }
}
