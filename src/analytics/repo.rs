use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

pub const PAGE_VIEW: &str = "page_view";

pub struct NewEvent {
    pub event_type: String,
    pub data: Value,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

pub async fn insert(db: &PgPool, event: &NewEvent) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO analytics_events (event_type, data, user_agent, ip)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&event.event_type)
    .bind(&event.data)
    .bind(&event.user_agent)
    .bind(&event.ip)
    .execute(db)
    .await?;
    Ok(())
}

/// Page views bucketed per calendar day.
#[derive(Debug, Serialize, FromRow)]
pub struct DailyViews {
    pub day: String,
    pub views: i64,
}

pub async fn page_views_per_day(
    db: &PgPool,
    since: OffsetDateTime,
) -> anyhow::Result<Vec<DailyViews>> {
    let rows = sqlx::query_as::<_, DailyViews>(
        r#"
        SELECT to_char(created_at, 'YYYY-MM-DD') AS day, COUNT(*)::BIGINT AS views
        FROM analytics_events
        WHERE event_type = $1 AND created_at >= $2
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(PAGE_VIEW)
    .bind(since)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn page_view_count(db: &PgPool, since: OffsetDateTime) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM analytics_events WHERE event_type = $1 AND created_at >= $2",
    )
    .bind(PAGE_VIEW)
    .bind(since)
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// Per-service popularity derived from frozen line-item prices.
#[derive(Debug, Serialize, FromRow)]
pub struct ServicePopularity {
    pub id: uuid::Uuid,
    pub title: String,
    pub bookings: i64,
    pub revenue: i64,
}

pub async fn popular_services(
    db: &PgPool,
    since: Option<OffsetDateTime>,
    limit: i64,
) -> anyhow::Result<Vec<ServicePopularity>> {
    let rows = sqlx::query_as::<_, ServicePopularity>(
        r#"
        SELECT s.id, s.title,
               COUNT(*)::BIGINT AS bookings,
               COALESCE(SUM(bs.price_at_booking), 0)::BIGINT AS revenue
        FROM booking_services bs
        JOIN bookings b ON b.id = bs.booking_id
        JOIN services s ON s.id = bs.service_id
        WHERE ($1::TIMESTAMPTZ IS NULL OR b.created_at >= $1)
        GROUP BY s.id, s.title
        ORDER BY bookings DESC
        LIMIT $2
        "#,
    )
    .bind(since)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Bookings and revenue bucketed per calendar month, oldest first.
#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyTrend {
    pub month: String,
    pub bookings: i64,
    pub revenue: i64,
}

pub async fn monthly_trends(db: &PgPool, months: i64) -> anyhow::Result<Vec<MonthlyTrend>> {
    let mut rows = sqlx::query_as::<_, MonthlyTrend>(
        r#"
        SELECT to_char(created_at, 'YYYY-MM') AS month,
               COUNT(*)::BIGINT AS bookings,
               COALESCE(SUM(total_amount), 0)::BIGINT AS revenue
        FROM bookings
        GROUP BY month
        ORDER BY month DESC
        LIMIT $1
        "#,
    )
    .bind(months)
    .fetch_all(db)
    .await?;
    rows.reverse();
    Ok(rows)
}
