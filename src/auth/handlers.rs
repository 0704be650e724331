use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, Role},
        repo::User,
        services::{is_valid_email, verify_password, AuthUser, JwtKeys},
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(get_me))
}

fn public_user(user: &User) -> PublicUser {
    PublicUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: Role::parse(&user.role),
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("Invalid credentials".into())
        })?;

    if !user.is_active {
        warn!(user_id = %user.id, "login on deactivated account");
        return Err(ApiError::Unauthorized("Account is deactivated".into()));
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let role = Role::parse(&user.role);
    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id, role)?;
    let refresh_token = keys.sign_refresh(user.id, role)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(ApiResponse::data(AuthResponse {
        access_token,
        refresh_token,
        user: public_user(&user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    let role = Role::parse(&user.role);
    let access_token = keys.sign_access(user.id, role)?;
    let refresh_token = keys.sign_refresh(user.id, role)?;

    Ok(ApiResponse::data(AuthResponse {
        access_token,
        refresh_token,
        user: public_user(&user),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    Ok(ApiResponse::data(public_user(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_hides_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Studio Admin".into(),
            email: "admin@example.com".into(),
            phone: "+91 98765 43210".into(),
            password_hash: "secret-hash".into(),
            role: "admin".into(),
            is_active: true,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&public_user(&user)).unwrap();
        assert!(json.contains("admin@example.com"));
        assert!(json.contains(r#""role":"admin""#));
        assert!(!json.contains("secret-hash"));
    }
}
