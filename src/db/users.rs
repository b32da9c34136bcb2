use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::User;

pub async fn insert_user(db: &SqlitePool, username: &str) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let api_token = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query("INSERT INTO users (id, username, api_token, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(username)
        .bind(&api_token)
        .bind(&now)
        .execute(db)
        .await?;

    Ok(User {
        id,
        username: username.to_string(),
        api_token,
        created_at: now,
    })
}

pub async fn find_by_token(db: &SqlitePool, token: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, username, api_token, created_at FROM users WHERE api_token = ?")
        .bind(token)
        .fetch_optional(db)
        .await
}
