use blushbook::app::{build_app, serve};
use blushbook::auth::{repo::User, services::hash_password};
use blushbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "blushbook=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    bootstrap_admin(&state).await?;

    let app = build_app(state);
    serve(app).await
}

/// Seeds the initial admin account from ADMIN_EMAIL / ADMIN_PASSWORD when both
/// are set. A no-op once the account exists.
async fn bootstrap_admin(state: &AppState) -> anyhow::Result<()> {
    let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };

    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string());
    let phone = std::env::var("ADMIN_PHONE").unwrap_or_default();
    let hash = hash_password(&password)?;
    User::ensure_admin(&state.db, &name, &email, &phone, &hash).await?;
    tracing::info!(%email, "admin account ensured");
    Ok(())
}
