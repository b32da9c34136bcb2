use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: String,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubjectRequest {
    pub title: String,
    pub slug: String,
}

/// Listing shape: subjects carry how many courses they group.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubjectWithCourseCount {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub course_count: i64,
}
