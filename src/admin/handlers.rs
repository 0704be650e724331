use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::{Date, Duration, OffsetDateTime, Time};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    analytics::repo as analytics_repo,
    auth::{dto::Role, repo::User, services::AdminUser},
    bookings::{dto::BookingDetails, service as bookings},
    error::ApiError,
    response::{ApiResponse, Pagination},
    state::AppState,
};

use super::repo::{self, UserSearch};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/toggle-status", put(toggle_user_status))
        .route("/admin/statistics", get(statistics))
}

pub fn start_of_month(now: OffsetDateTime) -> OffsetDateTime {
    let first = Date::from_calendar_date(now.year(), now.month(), 1)
        .expect("first day of month");
    now.replace_date(first).replace_time(Time::MIDNIGHT)
}

/// Weeks start on Sunday for the dashboard counters.
pub fn start_of_week(now: OffsetDateTime) -> OffsetDateTime {
    let days_back = now.date().weekday().number_days_from_sunday() as i64;
    (now - Duration::days(days_back)).replace_time(Time::MIDNIGHT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_users: i64,
    pub total_bookings: i64,
    pub total_services: i64,
    pub pending_bookings: i64,
    pub monthly_revenue: i64,
    pub weekly_page_views: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub overview: Overview,
    pub recent_bookings: Vec<BookingDetails>,
}

#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
) -> Result<Json<ApiResponse<DashboardResponse>>, ApiError> {
    let now = OffsetDateTime::now_utc();

    let overview = Overview {
        total_users: repo::customer_count(&state.db).await?,
        total_bookings: repo::booking_count(&state.db).await?,
        total_services: repo::active_service_count(&state.db).await?,
        pending_bookings: repo::pending_booking_count(&state.db).await?,
        monthly_revenue: repo::revenue_since(&state.db, start_of_month(now)).await?,
        weekly_page_views: analytics_repo::page_view_count(&state.db, start_of_week(now))
            .await?,
    };
    let recent_bookings = bookings::recent_bookings(&state, 5).await?;

    Ok(ApiResponse::data(DashboardResponse {
        overview,
        recent_bookings,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for AdminUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: Role::parse(&user.role),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Vec<AdminUserResponse>>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let (users, total) = repo::list_users(
        &state.db,
        &UserSearch {
            search: query.search.filter(|s| !s.trim().is_empty()),
            limit,
            offset: (page - 1) * limit,
        },
    )
    .await?;

    Ok(ApiResponse::paginated(
        users.into_iter().map(AdminUserResponse::from).collect(),
        Pagination::new(page, limit, total),
    ))
}

#[instrument(skip(state))]
pub async fn toggle_user_status(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let user = repo::toggle_active(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    info!(user_id = %id, %admin_id, is_active = user.is_active, "user status toggled");
    Ok(ApiResponse::data(json!({
        "id": user.id,
        "isActive": user.is_active,
    })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub booking_trends: Vec<analytics_repo::MonthlyTrend>,
    pub service_popularity: Vec<analytics_repo::ServicePopularity>,
    pub demographics: Value,
}

#[instrument(skip(state))]
pub async fn statistics(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
) -> Result<Json<ApiResponse<StatisticsResponse>>, ApiError> {
    let booking_trends = analytics_repo::monthly_trends(&state.db, 12).await?;
    let service_popularity = analytics_repo::popular_services(&state.db, None, 100).await?;

    Ok(ApiResponse::data(StatisticsResponse {
        booking_trends,
        service_popularity,
        demographics: mock_demographics(),
    }))
}

/// Stand-in demographics; there is no real data source behind this.
fn mock_demographics() -> Value {
    let mut rng = rand::thread_rng();
    json!({
        "ageGroups": [
            { "range": "18-25", "count": rng.gen_range(20..70) },
            { "range": "26-35", "count": rng.gen_range(40..120) },
            { "range": "36-45", "count": rng.gen_range(30..90) },
            { "range": "46+", "count": rng.gen_range(10..40) },
        ],
        "locations": [
            { "city": "Mumbai", "count": rng.gen_range(50..150) },
            { "city": "Delhi", "count": rng.gen_range(40..120) },
            { "city": "Bangalore", "count": rng.gen_range(30..90) },
            { "city": "Chennai", "count": rng.gen_range(25..75) },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn start_of_month_is_midnight_on_the_first() {
        let now = datetime!(2025-03-15 14:30:00 UTC);
        assert_eq!(start_of_month(now), datetime!(2025-03-01 00:00:00 UTC));
    }

    #[test]
    fn start_of_week_is_the_previous_sunday() {
        // 2025-03-12 is a Wednesday
        let now = datetime!(2025-03-12 09:00:00 UTC);
        assert_eq!(start_of_week(now), datetime!(2025-03-09 00:00:00 UTC));
        // a Sunday stays on the same day
        let sunday = datetime!(2025-03-09 23:59:00 UTC);
        assert_eq!(start_of_week(sunday), datetime!(2025-03-09 00:00:00 UTC));
    }

    #[test]
    fn demographics_counts_stay_in_range() {
        let value = mock_demographics();
        let groups = value["ageGroups"].as_array().unwrap();
        assert_eq!(groups.len(), 4);
        for group in groups {
            assert!(group["count"].as_i64().unwrap() > 0);
        }
    }
}
