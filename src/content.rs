//! Polymorphic content handling.
//!
//! A content item stores a `(content_type, object_id)` pair pointing into one
//! of four typed body tables. The pair is a soft reference: nothing at the
//! schema level ties the two rows together, so resolution must treat a
//! missing body as an error rather than an empty result.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};

use crate::error::AppError;

/// The closed set of content types an item may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    File,
    Image,
    Video,
}

pub const ALL_KINDS: [ContentKind; 4] = [
    ContentKind::Text,
    ContentKind::File,
    ContentKind::Image,
    ContentKind::Video,
];

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::File => "file",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
        }
    }

    /// The body table backing this kind.
    pub fn table(self) -> &'static str {
        match self {
            ContentKind::Text => "texts",
            ContentKind::File => "files",
            ContentKind::Image => "images",
            ContentKind::Video => "videos",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(ContentKind::Text),
            "file" => Some(ContentKind::File),
            "image" => Some(ContentKind::Image),
            "video" => Some(ContentKind::Video),
            _ => None,
        }
    }
}

/// A slot within a module referring to exactly one typed body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentItem {
    pub id: String,
    pub module_id: String,
    pub content_type: String,
    pub object_id: String,
    #[serde(rename = "order")]
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TextContent {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileContent {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImageContent {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VideoContent {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub url: String,
}

/// A resolved body. Serializes with a lowercase `type` tag next to the
/// variant's own fields, which is the `item` half of the listing shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBody {
    Text(TextContent),
    File(FileContent),
    Image(ImageContent),
    Video(VideoContent),
}

impl ContentBody {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentBody::Text(_) => ContentKind::Text,
            ContentBody::File(_) => ContentKind::File,
            ContentBody::Image(_) => ContentKind::Image,
            ContentBody::Video(_) => ContentKind::Video,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ContentBody::Text(t) => &t.title,
            ContentBody::File(f) => &f.title,
            ContentBody::Image(i) => &i.title,
            ContentBody::Video(v) => &v.title,
        }
    }

    pub fn owner_id(&self) -> &str {
        match self {
            ContentBody::Text(t) => &t.owner_id,
            ContentBody::File(f) => &f.owner_id,
            ContentBody::Image(i) => &i.owner_id,
            ContentBody::Video(v) => &v.owner_id,
        }
    }

    /// Type-specific presentational fragment.
    pub fn render(&self) -> String {
        match self {
            ContentBody::Text(t) => format!(
                "<div class=\"content-text\"><h3>{}</h3><p>{}</p></div>",
                escape(&t.title),
                escape(&t.body)
            ),
            ContentBody::File(f) => format!(
                "<div class=\"content-file\"><a href=\"{}\">{}</a></div>",
                escape(&f.file),
                escape(&f.title)
            ),
            ContentBody::Image(i) => format!(
                "<div class=\"content-image\"><img src=\"{}\" alt=\"{}\"></div>",
                escape(&i.file),
                escape(&i.title)
            ),
            ContentBody::Video(v) => format!(
                "<div class=\"content-video\"><iframe src=\"{}\" title=\"{}\"></iframe></div>",
                escape(&v.url),
                escape(&v.title)
            ),
        }
    }
}

/// Create/update payload for a content item. The serde tag closes the
/// enumeration: an unknown `type` is rejected before any row is written.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPayload {
    Text { title: String, body: String },
    File { title: String, file: String },
    Image { title: String, file: String },
    Video { title: String, url: String },
}

impl ContentPayload {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentPayload::Text { .. } => ContentKind::Text,
            ContentPayload::File { .. } => ContentKind::File,
            ContentPayload::Image { .. } => ContentKind::Image,
            ContentPayload::Video { .. } => ContentKind::Video,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ContentPayload::Text { title, .. }
            | ContentPayload::File { title, .. }
            | ContentPayload::Image { title, .. }
            | ContentPayload::Video { title, .. } => title,
        }
    }
}

/// One element of a content listing: `{"order": n, "item": {...}}`.
#[derive(Debug, Serialize)]
pub struct ContentEntry {
    #[serde(rename = "order")]
    pub position: i64,
    pub item: ContentBody,
}

/// Looks up the body row a content item points at.
///
/// A dangling reference (body deleted out-of-band) fails with NotFound so
/// callers can detect data drift instead of silently skipping the item.
pub async fn resolve<'e>(
    ex: impl SqliteExecutor<'e>,
    kind: ContentKind,
    object_id: &str,
) -> Result<ContentBody, AppError> {
    let sql = format!("SELECT * FROM {} WHERE id = ?", kind.table());
    let body = match kind {
        ContentKind::Text => sqlx::query_as::<_, TextContent>(&sql)
            .bind(object_id)
            .fetch_optional(ex)
            .await?
            .map(ContentBody::Text),
        ContentKind::File => sqlx::query_as::<_, FileContent>(&sql)
            .bind(object_id)
            .fetch_optional(ex)
            .await?
            .map(ContentBody::File),
        ContentKind::Image => sqlx::query_as::<_, ImageContent>(&sql)
            .bind(object_id)
            .fetch_optional(ex)
            .await?
            .map(ContentBody::Image),
        ContentKind::Video => sqlx::query_as::<_, VideoContent>(&sql)
            .bind(object_id)
            .fetch_optional(ex)
            .await?
            .map(ContentBody::Video),
    };
    body.ok_or(AppError::NotFound)
}

/// Resolves a content item row, rejecting tags outside the enumeration.
/// Rows with a foreign tag can only exist through out-of-band writes; they
/// surface as NotFound rather than being skipped.
pub async fn resolve_item<'e>(
    ex: impl SqliteExecutor<'e>,
    item: &ContentItem,
) -> Result<ContentBody, AppError> {
    let kind = ContentKind::parse(&item.content_type).ok_or(AppError::NotFound)?;
    resolve(ex, kind, &item.object_id).await
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_escapes_markup() {
        let body = ContentBody::Text(TextContent {
            id: "t1".into(),
            owner_id: "u1".into(),
            title: "Intro <script>".into(),
            created_at: "2025-07-12T00:00:00Z".into(),
            updated_at: "2025-07-12T00:00:00Z".into(),
            body: "a & b".into(),
        });
        let html = body.render();
        assert!(html.contains("Intro &lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[test]
    fn payload_rejects_unknown_tag() {
        let raw = serde_json::json!({"type": "podcast", "title": "x", "url": "http://e"});
        assert!(serde_json::from_value::<ContentPayload>(raw).is_err());
    }

    #[test]
    fn payload_tag_round_trip() {
        let raw = serde_json::json!({"type": "video", "title": "x", "url": "http://e"});
        let payload: ContentPayload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.kind(), ContentKind::Video);
        assert_eq!(payload.kind().table(), "videos");
    }

    #[test]
    fn body_serializes_with_type_tag() {
        let body = ContentBody::Video(VideoContent {
            id: "v1".into(),
            owner_id: "u1".into(),
            title: "Lecture".into(),
            created_at: "2025-07-12T00:00:00Z".into(),
            updated_at: "2025-07-12T00:00:00Z".into(),
            url: "https://example.com/v".into(),
        });
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["type"], "video");
        assert_eq!(value["url"], "https://example.com/v");
    }
}
