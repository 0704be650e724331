use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Testimonial {
    pub id: Uuid,
    pub client_name: String,
    pub client_image: Option<String>,
    pub rating: i32,
    pub review: String,
    pub service: Option<String>,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, client_name, client_image, rating, review, service, is_approved, \
     is_active, created_at, updated_at";

/// Publicly visible testimonials: approved by an admin and not hidden.
pub async fn list_approved(db: &PgPool) -> anyhow::Result<Vec<Testimonial>> {
    let rows = sqlx::query_as::<_, Testimonial>(&format!(
        "SELECT {COLUMNS} FROM testimonials WHERE is_approved AND is_active \
         ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Testimonial>> {
    let rows = sqlx::query_as::<_, Testimonial>(&format!(
        "SELECT {COLUMNS} FROM testimonials ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub struct NewTestimonial {
    pub client_name: String,
    pub client_image: Option<String>,
    pub rating: i32,
    pub review: String,
    pub service: Option<String>,
}

pub async fn insert(db: &PgPool, new: &NewTestimonial) -> anyhow::Result<Testimonial> {
    let row = sqlx::query_as::<_, Testimonial>(&format!(
        r#"
        INSERT INTO testimonials (client_name, client_image, rating, review, service)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&new.client_name)
    .bind(&new.client_image)
    .bind(new.rating)
    .bind(&new.review)
    .bind(&new.service)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn approve(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Testimonial>> {
    let row = sqlx::query_as::<_, Testimonial>(&format!(
        r#"
        UPDATE testimonials SET is_approved = TRUE, updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn set_visibility(
    db: &PgPool,
    id: Uuid,
    is_active: bool,
) -> anyhow::Result<Option<Testimonial>> {
    let row = sqlx::query_as::<_, Testimonial>(&format!(
        r#"
        UPDATE testimonials SET is_active = $2, updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(is_active)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Testimonials carry no booking references, so a hard delete is safe.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
