//! Route configuration and setup.

pub mod health;

use health::health_check;

use crate::api_doc::ApiDoc;
use crate::handlers::{analysis, audits, chats, market, upload};
use crate::state::AppState;
use armorclaw_core::Config;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for multipart boundaries and headers on top of the largest allowed file.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let body_limit = config.intake_policy().largest_file_size_bytes() + MULTIPART_OVERHEAD_BYTES;
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);
    tracing::info!(
        http_concurrency_limit,
        body_limit_bytes = body_limit,
        "HTTP limits configured"
    );

    let api = Router::new()
        .route(
            "/api/upload",
            post(upload::upload_file).get(upload::list_uploads),
        )
        .route(
            "/api/analysis/{id}",
            post(analysis::run_analysis).get(analysis::get_analysis),
        )
        .route("/api/audits", get(audits::list_audits))
        .route("/api/audits/export", get(audits::export_audits))
        .route("/api/audits/{id}", delete(audits::delete_audit))
        .route("/api/audits/{id}/visibility", patch(audits::set_visibility))
        .route("/api/audits/{id}/file", get(audits::download_audit_file))
        .route("/api/market", get(market::list_market))
        .route("/api/chat", post(chats::send_message))
        .route("/api/chats", get(chats::list_chats).post(chats::create_chat))
        .route(
            "/api/chats/{id}",
            get(chats::get_chat).delete(chats::delete_chat),
        )
        .route("/health", get(health_check))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    let app = api
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
