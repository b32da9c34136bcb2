//! Acting-identity extraction.
//!
//! Authentication providers proper are outside this service; the boundary is
//! a static bearer token per user. Every mutating handler takes a
//! [`CurrentUser`] and ownership is re-checked server-side from it, never
//! from anything the client claims.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

        let user = db::users::find_by_token(&state.db, token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser(user))
    }
}
