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
    state::AppState,
    storage::store_media,
};

use super::dto::{SetVisibilityRequest, TestimonialResponse};
use super::repo::{self, NewTestimonial};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/testimonials", get(list_approved))
        .route("/testimonials", post(create_testimonial))
        .route("/testimonials/all", get(list_all))
        .route("/testimonials/:id/approve", put(approve))
        .route("/testimonials/:id", put(set_visibility))
        .route("/testimonials/:id", delete(delete_testimonial))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}

#[instrument(skip(state))]
pub async fn list_approved(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TestimonialResponse>>>, ApiError> {
    let testimonials = repo::list_approved(&state.db).await?;
    Ok(ApiResponse::data(
        testimonials
            .into_iter()
            .map(TestimonialResponse::from)
            .collect(),
    ))
}

/// Public submission; created unapproved and invisible until an admin
/// moderates it.
#[instrument(skip(state, multipart))]
pub async fn create_testimonial(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut client_name = None;
    let mut client_image = None;
    let mut rating: Option<i32> = None;
    let mut review = None;
    let mut service = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "clientName" => client_name = Some(field.text().await.map_err(bad_field)?),
            "rating" => rating = field.text().await.map_err(bad_field)?.parse().ok(),
            "review" => review = Some(field.text().await.map_err(bad_field)?),
            "service" => service = Some(field.text().await.map_err(bad_field)?),
            "clientImage" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_field)?;
                let url =
                    store_media(state.storage.as_ref(), "testimonials", data, &content_type)
                        .await?;
                client_image = Some(url);
            }
            _ => {}
        }
    }

    let mut errors = Vec::new();
    let client_name = match client_name.filter(|n| !n.trim().is_empty()) {
        Some(n) => n,
        None => {
            errors.push(FieldError::new("clientName", "Client name is required"));
            String::new()
        }
    };
    let review = match review.filter(|r| !r.trim().is_empty()) {
        Some(r) => r,
        None => {
            errors.push(FieldError::new("review", "Review is required"));
            String::new()
        }
    };
    let rating = match rating.filter(|r| (1..=5).contains(r)) {
        Some(r) => r,
        None => {
            errors.push(FieldError::new("rating", "Rating must be between 1 and 5"));
            0
        }
    };
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let testimonial = repo::insert(
        &state.db,
        &NewTestimonial {
            client_name,
            client_image,
            rating,
            review,
            service: service.filter(|s| !s.trim().is_empty()),
        },
    )
    .await?;

    info!(testimonial_id = %testimonial.id, "testimonial submitted");
    Ok(ApiResponse::created(TestimonialResponse::from(testimonial)))
}

#[instrument(skip(state))]
pub async fn list_all(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
) -> Result<Json<ApiResponse<Vec<TestimonialResponse>>>, ApiError> {
    let testimonials = repo::list_all(&state.db).await?;
    Ok(ApiResponse::data(
        testimonials
            .into_iter()
            .map(TestimonialResponse::from)
            .collect(),
    ))
}

#[instrument(skip(state))]
pub async fn approve(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TestimonialResponse>>, ApiError> {
    let testimonial = repo::approve(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Testimonial"))?;
    info!(testimonial_id = %id, %admin_id, "testimonial approved");
    Ok(ApiResponse::data(testimonial.into()))
}

#[instrument(skip(state, payload))]
pub async fn set_visibility(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetVisibilityRequest>,
) -> Result<Json<ApiResponse<TestimonialResponse>>, ApiError> {
    let testimonial = repo::set_visibility(&state.db, id, payload.is_active)
        .await?
        .ok_or(ApiError::NotFound("Testimonial"))?;
    Ok(ApiResponse::data(testimonial.into()))
}

#[instrument(skip(state))]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Testimonial"));
    }
    info!(testimonial_id = %id, %admin_id, "testimonial deleted");
    Ok(ApiResponse::message("Testimonial deleted successfully"))
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(e.to_string())
}
