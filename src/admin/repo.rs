use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;

const COLUMNS: &str = "id, name, email, phone, password_hash, role, is_active, created_at";

pub struct UserSearch {
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

fn push_search<'a>(qb: &mut QueryBuilder<'a, Postgres>, pattern: &'a Option<String>) {
    if let Some(pattern) = pattern {
        qb.push(" AND (name ILIKE ").push_bind(pattern);
        qb.push(" OR email ILIKE ").push_bind(pattern);
        qb.push(")");
    }
}

pub async fn list_users(db: &PgPool, search: &UserSearch) -> anyhow::Result<(Vec<User>, i64)> {
    let pattern = search.search.as_ref().map(|s| format!("%{s}%"));

    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM users WHERE TRUE"));
    push_search(&mut qb, &pattern);
    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(search.limit)
        .push(" OFFSET ")
        .push_bind(search.offset);
    let users = qb.build_query_as::<User>().fetch_all(db).await?;

    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE TRUE");
    push_search(&mut qb, &pattern);
    let total: i64 = qb.build_query_scalar().fetch_one(db).await?;

    Ok((users, total))
}

pub async fn toggle_active(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let row = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET is_active = NOT is_active
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn customer_count(db: &PgPool) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'customer'")
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn booking_count(db: &PgPool) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn pending_booking_count(db: &PgPool) -> anyhow::Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = 'pending'")
            .fetch_one(db)
            .await?;
    Ok(count)
}

pub async fn active_service_count(db: &PgPool) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE is_active")
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Month-to-date revenue over bookings an admin has confirmed or
/// completed.
pub async fn revenue_since(db: &PgPool, since: OffsetDateTime) -> anyhow::Result<i64> {
    let revenue: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total_amount), 0)::BIGINT
        FROM bookings
        WHERE created_at >= $1 AND status IN ('confirmed', 'completed')
        "#,
    )
    .bind(since)
    .fetch_one(db)
    .await?;
    Ok(revenue)
}
