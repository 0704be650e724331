use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub appointment_date: Date,
    pub appointment_time: String,
    pub total_amount: i64,
    pub status: String,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Line item joined against the catalog for display.
#[derive(Debug, Clone, FromRow)]
pub struct LineItemRow {
    pub booking_id: Uuid,
    pub position: i32,
    pub price_at_booking: i64,
    pub service_id: Uuid,
    pub title: String,
    pub current_price: i64,
    pub duration_minutes: i32,
    pub category: String,
}

pub struct NewBooking {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub appointment_date: Date,
    pub appointment_time: String,
    pub total_amount: i64,
    pub notes: Option<String>,
    /// Ordered (service id, frozen price) pairs.
    pub line_items: Vec<(Uuid, i64)>,
}

const COLUMNS: &str = "id, customer_name, customer_email, customer_phone, appointment_date, \
     appointment_time, total_amount, status, payment_status, notes, created_at, updated_at";

/// Inserts the booking and its line items in one transaction so a
/// failure never leaves a partial booking behind.
pub async fn insert(db: &PgPool, new: &NewBooking) -> anyhow::Result<BookingRow> {
    let mut tx = db.begin().await?;

    let booking = sqlx::query_as::<_, BookingRow>(&format!(
        r#"
        INSERT INTO bookings (customer_name, customer_email, customer_phone,
                              appointment_date, appointment_time, total_amount, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&new.customer_name)
    .bind(&new.customer_email)
    .bind(&new.customer_phone)
    .bind(new.appointment_date)
    .bind(&new.appointment_time)
    .bind(new.total_amount)
    .bind(&new.notes)
    .fetch_one(&mut *tx)
    .await?;

    for (position, (service_id, price)) in new.line_items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO booking_services (booking_id, position, service_id, price_at_booking)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(booking.id)
        .bind(position as i32)
        .bind(service_id)
        .bind(price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(booking)
}

#[derive(Debug, Default)]
pub struct BookingFilter {
    pub status: Option<String>,
    pub date: Option<Date>,
    pub limit: i64,
    pub offset: i64,
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a BookingFilter) {
    if let Some(status) = &filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(date) = filter.date {
        // appointment_date is a DATE, so equality covers the whole
        // [date 00:00, date+1d 00:00) calendar day
        qb.push(" AND appointment_date = ").push_bind(date);
    }
}

pub async fn list(db: &PgPool, filter: &BookingFilter) -> anyhow::Result<Vec<BookingRow>> {
    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM bookings WHERE TRUE"));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);
    let rows = qb.build_query_as::<BookingRow>().fetch_all(db).await?;
    Ok(rows)
}

pub async fn count(db: &PgPool, filter: &BookingFilter) -> anyhow::Result<i64> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM bookings WHERE TRUE");
    push_filters(&mut qb, filter);
    let total: i64 = qb.build_query_scalar().fetch_one(db).await?;
    Ok(total)
}

pub async fn update_status(
    db: &PgPool,
    id: Uuid,
    status: &str,
) -> anyhow::Result<Option<BookingRow>> {
    let row = sqlx::query_as::<_, BookingRow>(&format!(
        r#"
        UPDATE bookings SET status = $2, updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Ordered line items for a set of bookings, resolved against the
/// catalog.
pub async fn line_items(db: &PgPool, booking_ids: &[Uuid]) -> anyhow::Result<Vec<LineItemRow>> {
    let rows = sqlx::query_as::<_, LineItemRow>(
        r#"
        SELECT bs.booking_id, bs.position, bs.price_at_booking,
               s.id AS service_id, s.title, s.price AS current_price,
               s.duration_minutes, s.category
        FROM booking_services bs
        JOIN services s ON s.id = bs.service_id
        WHERE bs.booking_id = ANY($1)
        ORDER BY bs.booking_id, bs.position
        "#,
    )
    .bind(booking_ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Dashboard rollup: bookings and frozen-price revenue per status since
/// `since`.
#[derive(Debug, FromRow)]
pub struct StatusRollup {
    pub status: String,
    pub count: i64,
    pub revenue: i64,
}

pub async fn rollup_by_status(
    db: &PgPool,
    since: OffsetDateTime,
) -> anyhow::Result<Vec<StatusRollup>> {
    let rows = sqlx::query_as::<_, StatusRollup>(
        r#"
        SELECT status, COUNT(*) AS count, COALESCE(SUM(total_amount), 0)::BIGINT AS revenue
        FROM bookings
        WHERE created_at >= $1
        GROUP BY status
        "#,
    )
    .bind(since)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
