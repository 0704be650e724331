use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AdminUser,
    error::{ApiError, FieldError},
    response::ApiResponse,
    services::{
        dto::{ServiceResponse, UpdateServiceRequest},
        repo::{self, NewService, ServicePatch},
    },
    state::AppState,
    storage::store_media,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services))
        .route("/services/:id", get(get_service))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/services", post(create_service))
        .route("/services/:id", put(update_service))
        .route("/services/:id", delete(delete_service))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

#[instrument(skip(state))]
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ServiceResponse>>>, ApiError> {
    let services = repo::list_active(&state.db).await?;
    Ok(ApiResponse::data(
        services.into_iter().map(ServiceResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ServiceResponse>>, ApiError> {
    let service = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Service"))?;
    Ok(ApiResponse::data(service.into()))
}

/// Multipart form: title, description, price, duration, icon, category
/// plus up to 5 `images` files, each uploaded to storage before insert.
#[instrument(skip(state, multipart))]
pub async fn create_service(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut title = None;
    let mut description = None;
    let mut price: Option<i64> = None;
    let mut duration: Option<i32> = None;
    let mut icon = None;
    let mut category = None;
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "title" => title = Some(field.text().await.map_err(bad_field)?),
            "description" => description = Some(field.text().await.map_err(bad_field)?),
            "price" => price = field.text().await.map_err(bad_field)?.parse().ok(),
            "duration" => duration = field.text().await.map_err(bad_field)?.parse().ok(),
            "icon" => icon = Some(field.text().await.map_err(bad_field)?),
            "category" => category = Some(field.text().await.map_err(bad_field)?),
            "images" | "images[]" => {
                if images.len() >= 5 {
                    return Err(ApiError::BadRequest("At most 5 images allowed".into()));
                }
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_field)?;
                let url = store_media(state.storage.as_ref(), "services", data, &content_type)
                    .await?;
                images.push(url);
            }
            _ => {}
        }
    }

    let mut errors = Vec::new();
    let require = |value: Option<String>, field: &'static str, errors: &mut Vec<FieldError>| {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => v,
            None => {
                errors.push(FieldError::new(field, format!("{field} is required")));
                String::new()
            }
        }
    };
    let title = require(title, "title", &mut errors);
    let description = require(description, "description", &mut errors);
    let icon = require(icon, "icon", &mut errors);
    let category = require(category, "category", &mut errors);
    let price = match price.filter(|p| *p > 0) {
        Some(p) => p,
        None => {
            errors.push(FieldError::new("price", "price must be a positive amount"));
            0
        }
    };
    let duration = match duration.filter(|d| *d > 0) {
        Some(d) => d,
        None => {
            errors.push(FieldError::new("duration", "duration must be positive minutes"));
            0
        }
    };
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let service = repo::insert(
        &state.db,
        &NewService {
            title,
            description,
            price,
            duration_minutes: duration,
            icon,
            category,
            images,
        },
    )
    .await?;

    info!(service_id = %service.id, %admin_id, "service created");
    Ok(ApiResponse::created(ServiceResponse::from(service)))
}

#[instrument(skip(state, payload))]
pub async fn update_service(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<Json<ApiResponse<ServiceResponse>>, ApiError> {
    if payload.price.is_some_and(|p| p <= 0) {
        return Err(ApiError::Validation(vec![FieldError::new(
            "price",
            "price must be a positive amount",
        )]));
    }
    if payload.duration.is_some_and(|d| d <= 0) {
        return Err(ApiError::Validation(vec![FieldError::new(
            "duration",
            "duration must be positive minutes",
        )]));
    }

    let patch = ServicePatch {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        duration_minutes: payload.duration,
        icon: payload.icon,
        category: payload.category,
        images: payload.images,
        is_active: payload.is_active,
    };
    let service = repo::update(&state.db, id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Service"))?;
    Ok(ApiResponse::data(service.into()))
}

/// Soft delete; the row survives because bookings may reference it.
#[instrument(skip(state))]
pub async fn delete_service(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    repo::deactivate(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Service"))?;
    info!(service_id = %id, %admin_id, "service deactivated");
    Ok(ApiResponse::message("Service deleted successfully"))
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(e.to_string())
}
