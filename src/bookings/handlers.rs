use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::services::AdminUser,
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

use super::dto::{BookingDetails, CreateBookingRequest, ListBookingsQuery, UpdateStatusRequest};
use super::service;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/bookings", post(create_booking))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/:id/status", put(update_status))
}

/// Customer-facing; requires no authentication.
#[instrument(skip(state, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Response, ApiError> {
    let booking = service::create_booking(&state, payload).await?;
    Ok(ApiResponse::created(booking))
}

#[instrument(skip(state))]
pub async fn list_bookings(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ApiResponse<Vec<BookingDetails>>>, ApiError> {
    let (bookings, pagination) = service::list_bookings(&state, query).await?;
    Ok(ApiResponse::paginated(bookings, pagination))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<BookingDetails>>, ApiError> {
    let booking = service::update_status(&state, id, payload.status).await?;
    Ok(ApiResponse::data(booking))
}
