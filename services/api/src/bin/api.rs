//! services/api/src/bin/api.rs

use api_lib::{adapters::db::DbAdapter, config::Config, error::ApiError, web, web::state::AppState};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database {}...", config.database_name);
    let connect_options =
        PgConnectOptions::from_str(&config.database_url)?.database(&config.database_name);
    let db_pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options)
        .await?;
    info!("Connected!");
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState and Router ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
    });
    let app = web::router(app_state);

    // --- 4. Start the Server ---
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Your app is listening on {}", listener.local_addr()?);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    axum::serve(listener, app).await?;

    Ok(())
}
