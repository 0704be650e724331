use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct SocialAccount {
    pub platform: String,
    pub followers: i64,
    pub posts: i64,
    pub engagement: i64,
    pub views: i64,
    pub likes: i64,
    pub last_updated: OffsetDateTime,
}

const COLUMNS: &str = "platform, followers, posts, engagement, views, likes, last_updated";

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<SocialAccount>> {
    let rows = sqlx::query_as::<_, SocialAccount>(&format!(
        "SELECT {COLUMNS} FROM social_accounts ORDER BY last_updated DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, platform: &str) -> anyhow::Result<Option<SocialAccount>> {
    let row = sqlx::query_as::<_, SocialAccount>(&format!(
        "SELECT {COLUMNS} FROM social_accounts WHERE platform = $1"
    ))
    .bind(platform)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub struct Metrics {
    pub followers: i64,
    pub posts: i64,
    pub engagement: i64,
    pub views: i64,
    pub likes: i64,
}

pub async fn upsert(
    db: &PgPool,
    platform: &str,
    metrics: &Metrics,
) -> anyhow::Result<SocialAccount> {
    let row = sqlx::query_as::<_, SocialAccount>(&format!(
        r#"
        INSERT INTO social_accounts (platform, followers, posts, engagement, views, likes, last_updated)
        VALUES ($1, $2, $3, $4, $5, $6, now())
        ON CONFLICT (platform) DO UPDATE SET
            followers = EXCLUDED.followers,
            posts = EXCLUDED.posts,
            engagement = EXCLUDED.engagement,
            views = EXCLUDED.views,
            likes = EXCLUDED.likes,
            last_updated = now()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(platform)
    .bind(metrics.followers)
    .bind(metrics.posts)
    .bind(metrics.engagement)
    .bind(metrics.views)
    .bind(metrics.likes)
    .fetch_one(db)
    .await?;
    Ok(row)
}
