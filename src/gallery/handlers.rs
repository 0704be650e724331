use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AdminUser,
    error::ApiError,
    response::ApiResponse,
    state::AppState,
    storage::store_media,
};

use super::dto::{media_type_for, split_tags, GalleryItemResponse, GalleryListQuery};
use super::repo::{self, GalleryPatch, NewGalleryItem};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/gallery", get(list_gallery))
        .route("/gallery", post(create_item))
        .route("/gallery/:id", put(update_item))
        .route("/gallery/:id", delete(delete_item))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
}

#[instrument(skip(state))]
pub async fn list_gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryListQuery>,
) -> Result<Json<ApiResponse<Vec<GalleryItemResponse>>>, ApiError> {
    let items = repo::list_active(&state.db, query.category.as_deref()).await?;
    Ok(ApiResponse::data(
        items.into_iter().map(GalleryItemResponse::from).collect(),
    ))
}

/// Multipart form; the media file arrives under the `image` field
/// regardless of whether it is an image or a video.
#[instrument(skip(state, multipart))]
pub async fn create_item(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut title = None;
    let mut description = None;
    let mut category = None;
    let mut tags = Vec::new();
    let mut media: Option<(String, String)> = None; // (url, media_type)

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "title" => title = Some(field.text().await.map_err(bad_field)?),
            "description" => description = Some(field.text().await.map_err(bad_field)?),
            "category" => category = Some(field.text().await.map_err(bad_field)?),
            "tags" => tags = split_tags(&field.text().await.map_err(bad_field)?),
            "image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_field)?;
                let url =
                    store_media(state.storage.as_ref(), "gallery", data, &content_type).await?;
                media = Some((url, media_type_for(&content_type).to_string()));
            }
            _ => {}
        }
    }

    let (media_url, media_type) =
        media.ok_or_else(|| ApiError::BadRequest("Media file is required".into()))?;
    let category =
        category.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            ApiError::BadRequest("Category is required".into())
        })?;

    let item = repo::insert(
        &state.db,
        &NewGalleryItem {
            title,
            description,
            media_url,
            media_type,
            category,
            tags,
        },
    )
    .await?;

    info!(item_id = %item.id, %admin_id, "gallery item uploaded");
    Ok(ApiResponse::created(GalleryItemResponse::from(item)))
}

#[instrument(skip(state, multipart))]
pub async fn update_item(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<GalleryItemResponse>>, ApiError> {
    let mut patch = GalleryPatch::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "title" => patch.title = Some(field.text().await.map_err(bad_field)?),
            "description" => patch.description = Some(field.text().await.map_err(bad_field)?),
            "category" => patch.category = Some(field.text().await.map_err(bad_field)?),
            "tags" => patch.tags = Some(split_tags(&field.text().await.map_err(bad_field)?)),
            "isActive" => {
                patch.is_active = field.text().await.map_err(bad_field)?.parse().ok()
            }
            "image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_field)?;
                let url =
                    store_media(state.storage.as_ref(), "gallery", data, &content_type).await?;
                patch.media_url = Some(url);
                patch.media_type = Some(media_type_for(&content_type).to_string());
            }
            _ => {}
        }
    }

    // capture the old media before the update so the replaced object can
    // be removed from storage afterwards
    let previous = if patch.media_url.is_some() {
        repo::find(&state.db, id).await?
    } else {
        None
    };

    let item = repo::update(&state.db, id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Gallery item"))?;

    if let Some(previous) = previous.filter(|p| p.media_url != item.media_url) {
        if let Some(key) = state.storage.key_of(&previous.media_url) {
            let storage = state.storage.clone();
            tokio::spawn(async move {
                if let Err(e) = storage.delete_object(&key).await {
                    warn!(%key, error = %e, "failed to delete replaced media");
                }
            });
        }
    }

    Ok(ApiResponse::data(item.into()))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    repo::deactivate(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Gallery item"))?;
    info!(item_id = %id, %admin_id, "gallery item deactivated");
    Ok(ApiResponse::message("Gallery item deleted successfully"))
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(e.to_string())
}
