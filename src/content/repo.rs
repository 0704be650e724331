use serde_json::Value;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct ContentRow {
    pub section: String,
    pub data: Value,
    pub updated_at: OffsetDateTime,
}

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<ContentRow>> {
    let rows = sqlx::query_as::<_, ContentRow>(
        "SELECT section, data, updated_at FROM content_sections ORDER BY section",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, section: &str) -> anyhow::Result<Option<ContentRow>> {
    let row = sqlx::query_as::<_, ContentRow>(
        "SELECT section, data, updated_at FROM content_sections WHERE section = $1",
    )
    .bind(section)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn upsert(db: &PgPool, section: &str, data: &Value) -> anyhow::Result<ContentRow> {
    let row = sqlx::query_as::<_, ContentRow>(
        r#"
        INSERT INTO content_sections (section, data)
        VALUES ($1, $2)
        ON CONFLICT (section) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
        RETURNING section, data, updated_at
        "#,
    )
    .bind(section)
    .bind(data)
    .fetch_one(db)
    .await?;
    Ok(row)
}
