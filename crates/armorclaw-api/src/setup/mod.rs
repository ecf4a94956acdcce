//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use armorclaw_core::Config;
use armorclaw_db::{ChatRepository, SubmissionRepository};
use std::sync::Arc;

/// Initialize the entire application: telemetry, database, storage, services and routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(
        &config,
        Arc::new(SubmissionRepository::new(pool.clone())),
        Arc::new(ChatRepository::new(pool)),
        storage,
    )?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
