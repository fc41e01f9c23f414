//! services/api/src/bin/create_admin.rs
//!
//! Creates the administrator account, or resets its password if it already exists.
//!
//! Reads `DATABASE_URL` plus `ADMIN_USERNAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`
//! from the environment (or `.env`).

use api_lib::{
    adapters::DbAdapter,
    admin::{ensure_admin, AdminBootstrap},
    config::ConfigError,
    error::ApiError,
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = required("DATABASE_URL")?;
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "AdminUser".to_string());
    let email = required("ADMIN_EMAIL")?;
    let password = required("ADMIN_PASSWORD")?;

    let db_pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;
    let db = DbAdapter::new(db_pool);
    db.run_migrations().await?;

    match ensure_admin(&db, &username, &email, &password)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
    {
        AdminBootstrap::Created(user) => info!(user_id = %user.id, "Admin user created"),
        AdminBootstrap::Updated(user) => info!(user_id = %user.id, "Admin password updated"),
    }

    Ok(())
}
