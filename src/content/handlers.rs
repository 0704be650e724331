use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    auth::services::AdminUser,
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

use super::dto::{parse_section, ContentResponse};
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/content", get(list_content))
        .route("/content/:section", get(get_section))
        .route("/content/:section", put(update_section))
}

#[instrument(skip(state))]
pub async fn list_content(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ContentResponse>>>, ApiError> {
    let rows = repo::list(&state.db).await?;
    Ok(ApiResponse::data(
        rows.into_iter()
            .map(|row| ContentResponse {
                section: row.section,
                data: row.data,
                updated_at: row.updated_at,
            })
            .collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<Json<ApiResponse<ContentResponse>>, ApiError> {
    let row = repo::find(&state.db, &section)
        .await?
        .ok_or(ApiError::NotFound("Content"))?;
    Ok(ApiResponse::data(ContentResponse {
        section: row.section,
        data: row.data,
        updated_at: row.updated_at,
    }))
}

/// The body must match the section's typed shape; the stored JSON is
/// the canonical serialization of that struct, never a raw merge of
/// client keys.
#[instrument(skip(state, body))]
pub async fn update_section(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(section): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<ContentResponse>>, ApiError> {
    let content = parse_section(&section, body)?;
    let data = serde_json::to_value(&content).map_err(anyhow::Error::from)?;
    let row = repo::upsert(&state.db, &section, &data).await?;
    info!(%section, %admin_id, "content section updated");
    Ok(ApiResponse::data(ContentResponse {
        section: row.section,
        data: row.data,
        updated_at: row.updated_at,
    }))
}
