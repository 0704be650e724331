use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct GalleryItem {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: String,
    pub media_type: String,
    pub category: String,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str =
    "id, title, description, media_url, media_type, category, tags, is_active, created_at, updated_at";

pub async fn list_active(
    db: &PgPool,
    category: Option<&str>,
) -> anyhow::Result<Vec<GalleryItem>> {
    let rows = match category {
        Some(category) => {
            sqlx::query_as::<_, GalleryItem>(&format!(
                "SELECT {COLUMNS} FROM gallery_items WHERE is_active AND category = $1 \
                 ORDER BY created_at DESC"
            ))
            .bind(category)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, GalleryItem>(&format!(
                "SELECT {COLUMNS} FROM gallery_items WHERE is_active ORDER BY created_at DESC"
            ))
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<GalleryItem>> {
    let row = sqlx::query_as::<_, GalleryItem>(&format!(
        "SELECT {COLUMNS} FROM gallery_items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub struct NewGalleryItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: String,
    pub media_type: String,
    pub category: String,
    pub tags: Vec<String>,
}

pub async fn insert(db: &PgPool, new: &NewGalleryItem) -> anyhow::Result<GalleryItem> {
    let row = sqlx::query_as::<_, GalleryItem>(&format!(
        r#"
        INSERT INTO gallery_items (title, description, media_url, media_type, category, tags)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.media_url)
    .bind(&new.media_type)
    .bind(&new.category)
    .bind(&new.tags)
    .fetch_one(db)
    .await?;
    Ok(row)
}

#[derive(Debug, Default)]
pub struct GalleryPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    patch: &GalleryPatch,
) -> anyhow::Result<Option<GalleryItem>> {
    let row = sqlx::query_as::<_, GalleryItem>(&format!(
        r#"
        UPDATE gallery_items SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            media_url = COALESCE($4, media_url),
            media_type = COALESCE($5, media_type),
            category = COALESCE($6, category),
            tags = COALESCE($7, tags),
            is_active = COALESCE($8, is_active),
            updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(&patch.media_url)
    .bind(&patch.media_type)
    .bind(&patch.category)
    .bind(&patch.tags)
    .bind(patch.is_active)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn deactivate(db: &PgPool, id: Uuid) -> anyhow::Result<Option<GalleryItem>> {
    let row = sqlx::query_as::<_, GalleryItem>(&format!(
        r#"
        UPDATE gallery_items SET is_active = FALSE, updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
