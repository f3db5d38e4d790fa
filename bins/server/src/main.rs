//! Hashdrop server
//!
//! Main entry point for the anonymous text and file sharing service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hashdrop_api::{AppState, create_router};
use hashdrop_core::storage::{StorageConfig, StorageService};
use hashdrop_db::connect;
use hashdrop_db::migration::{Migrator, MigratorTrait};
use hashdrop_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hashdrop=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    if config.database.auto_migrate {
        Migrator::up(&db, None)
            .await
            .context("Failed to run migrations")?;
        info!("Database schema is up to date");
    }

    let storage = StorageService::from_config(StorageConfig::from_settings(&config.storage))
        .context("Failed to initialize object storage")?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Object storage configured"
    );

    let state = AppState::new(db, Arc::new(storage), &config.server, &config.upload);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        %addr,
        base_url = %config.server.base_url,
        max_upload_size = config.upload.max_upload_size,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
