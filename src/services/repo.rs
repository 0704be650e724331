use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Catalog row. Prices are integer minor units. Rows are never
/// hard-deleted while bookings may reference them; `is_active` is the
/// soft-delete flag.
#[derive(Debug, Clone, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub duration_minutes: i32,
    pub icon: String,
    pub category: String,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, title, description, price, duration_minutes, icon, category, images, is_active, created_at, updated_at";

pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<Service>> {
    let rows = sqlx::query_as::<_, Service>(&format!(
        "SELECT {COLUMNS} FROM services WHERE is_active ORDER BY created_at"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Service>> {
    let row = sqlx::query_as::<_, Service>(&format!(
        "SELECT {COLUMNS} FROM services WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Bulk lookup for booking creation; callers detect missing ids by
/// comparing against what they asked for.
pub async fn find_by_ids(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Service>> {
    let rows = sqlx::query_as::<_, Service>(&format!(
        "SELECT {COLUMNS} FROM services WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub struct NewService {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub duration_minutes: i32,
    pub icon: String,
    pub category: String,
    pub images: Vec<String>,
}

pub async fn insert(db: &PgPool, new: &NewService) -> anyhow::Result<Service> {
    let row = sqlx::query_as::<_, Service>(&format!(
        r#"
        INSERT INTO services (title, description, price, duration_minutes, icon, category, images)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.price)
    .bind(new.duration_minutes)
    .bind(&new.icon)
    .bind(&new.category)
    .bind(&new.images)
    .fetch_one(db)
    .await?;
    Ok(row)
}

#[derive(Debug, Default)]
pub struct ServicePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub duration_minutes: Option<i32>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

pub async fn update(db: &PgPool, id: Uuid, patch: &ServicePatch) -> anyhow::Result<Option<Service>> {
    let row = sqlx::query_as::<_, Service>(&format!(
        r#"
        UPDATE services SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            price = COALESCE($4, price),
            duration_minutes = COALESCE($5, duration_minutes),
            icon = COALESCE($6, icon),
            category = COALESCE($7, category),
            images = COALESCE($8, images),
            is_active = COALESCE($9, is_active),
            updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(patch.price)
    .bind(patch.duration_minutes)
    .bind(&patch.icon)
    .bind(&patch.category)
    .bind(&patch.images)
    .bind(patch.is_active)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn deactivate(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Service>> {
    let row = sqlx::query_as::<_, Service>(&format!(
        r#"
        UPDATE services SET is_active = FALSE, updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
