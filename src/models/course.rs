use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::module::{Module, ModuleWithContents};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub owner_id: String,
    pub subject_id: String,
    pub title: String,
    pub slug: String,
    pub overview: String,
    pub created_at: String,
}

/// Create/update payload. The owner is never client-supplied; it is taken
/// from the authenticated identity on every call.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRequest {
    pub subject_id: String,
    pub title: String,
    pub slug: String,
    pub overview: String,
}

/// Public listing/detail shape: course metadata plus its module outline.
#[derive(Debug, Serialize)]
pub struct CourseWithModules {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<Module>,
}

/// Full detail for owners and enrolled students: every module with its
/// resolved content items.
#[derive(Debug, Serialize)]
pub struct CourseContents {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleWithContents>,
}
