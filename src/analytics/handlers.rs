use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tracing::instrument;

use crate::{
    auth::services::AdminUser,
    bookings::repo as bookings_repo,
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

use super::repo::{self, DailyViews, NewEvent, ServicePopularity, PAGE_VIEW};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/page-view", post(track_page_view))
        .route("/analytics/dashboard", get(dashboard))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewRequest {
    pub page: String,
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Lookback window in days.
    pub timeframe: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusStat {
    pub status: String,
    pub count: i64,
    pub total_revenue: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub page_views: Vec<DailyViews>,
    pub booking_stats: Vec<StatusStat>,
    pub popular_services: Vec<ServicePopularity>,
    pub total_users: i64,
    pub timeframe: String,
}

#[instrument(skip(state, headers, payload))]
pub async fn track_page_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PageViewRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string());

    repo::insert(
        &state.db,
        &NewEvent {
            event_type: PAGE_VIEW.to_string(),
            data: json!({ "page": payload.page }),
            user_agent: payload.user_agent,
            ip,
        },
    )
    .await?;
    Ok(ApiResponse::message("Recorded"))
}

/// On-demand rollups; nothing here is cached or incrementally
/// maintained.
#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardResponse>>, ApiError> {
    let days = query.timeframe.unwrap_or(30).clamp(1, 365);
    let since = OffsetDateTime::now_utc() - Duration::days(days);

    let page_views = repo::page_views_per_day(&state.db, since).await?;
    let booking_stats = bookings_repo::rollup_by_status(&state.db, since)
        .await?
        .into_iter()
        .map(|r| StatusStat {
            status: r.status,
            count: r.count,
            total_revenue: r.revenue,
        })
        .collect();
    let popular_services = repo::popular_services(&state.db, Some(since), 5).await?;

    let total_users: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'customer'")
            .fetch_one(&state.db)
            .await
            .map_err(anyhow::Error::from)?;

    Ok(ApiResponse::data(DashboardResponse {
        page_views,
        booking_stats,
        popular_services,
        total_users,
        timeframe: format!("{days} days"),
    }))
}
