use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub api_token: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub username: String,
}

/// Registration response. The only place the bearer token is ever echoed back.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
    pub api_token: String,
}
