//! Server startup and graceful shutdown

use anyhow::{Context, Result};
use armorclaw_core::Config;
use axum::Router;
use std::net::SocketAddr;

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let policy = config.intake_policy();
    tracing::info!(
        anonymous_max_files = policy.anonymous.max_files,
        anonymous_max_file_size_bytes = policy.anonymous.max_file_size_bytes,
        authenticated_max_files = policy.authenticated.max_files,
        authenticated_max_file_size_bytes = policy.authenticated.max_file_size_bytes,
        allowed_extensions = %policy.allowed_extensions.join(","),
        ai_configured = config.ai().api_key.is_some(),
        "Server ready and accepting connections"
    );

    // Connect info feeds the socket-address fallback of anonymous identities.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// # Panics
/// Panics if a signal handler cannot be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
