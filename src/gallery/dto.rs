use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::GalleryItem;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItemResponse {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub media_url: String,
    pub media_type: String,
    pub category: String,
    pub tags: Vec<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<GalleryItem> for GalleryItemResponse {
    fn from(item: GalleryItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            media_url: item.media_url,
            media_type: item.media_type,
            category: item.category,
            tags: item.tags,
            is_active: item.is_active,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryListQuery {
    pub category: Option<String>,
}

/// Comma-separated tag list from a form field.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Media kind inferred from the uploaded content type.
pub fn media_type_for(content_type: &str) -> &'static str {
    if content_type.starts_with("video/") {
        "video"
    } else {
        "image"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_split_and_trim() {
        assert_eq!(split_tags("bridal, mehndi ,party"), vec!["bridal", "mehndi", "party"]);
        assert_eq!(split_tags(""), Vec::<String>::new());
        assert_eq!(split_tags(" , ,"), Vec::<String>::new());
    }

    #[test]
    fn video_content_types_are_video_everything_else_image() {
        assert_eq!(media_type_for("video/mp4"), "video");
        assert_eq!(media_type_for("image/png"), "image");
        assert_eq!(media_type_for("application/octet-stream"), "image");
    }
}
