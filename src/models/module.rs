use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::content::ContentEntry;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Module {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "order")]
    pub position: i64,
}

/// One row of a bulk module submission. Rows without an id create new
/// modules; rows with `delete` set remove existing ones. Fully blank rows
/// (UI padding) are skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleEntry {
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub delete: bool,
}

impl ModuleEntry {
    pub fn is_blank(&self) -> bool {
        self.id.is_none()
            && !self.delete
            && self.title.trim().is_empty()
            && self.description.trim().is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleWithContents {
    #[serde(flatten)]
    pub module: Module,
    pub contents: Vec<ContentEntry>,
}
