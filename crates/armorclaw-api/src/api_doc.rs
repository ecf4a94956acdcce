//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::setup::routes;
use armorclaw_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ArmorClaw API",
        version = "0.1.0",
        description = "Upload eBPF programs and project archives, run an AI security audit on them, browse public reports and chat with the assistant."
    ),
    paths(
        routes::health::health_check,
        // Uploads
        handlers::upload::upload_file,
        handlers::upload::list_uploads,
        // Analysis
        handlers::analysis::run_analysis,
        handlers::analysis::get_analysis,
        // Audits
        handlers::audits::list_audits,
        handlers::audits::delete_audit,
        handlers::audits::set_visibility,
        handlers::audits::download_audit_file,
        handlers::audits::export_audits,
        // Market
        handlers::market::list_market,
        // Chat
        handlers::chats::send_message,
        handlers::chats::list_chats,
        handlers::chats::create_chat,
        handlers::chats::get_chat,
        handlers::chats::delete_chat,
    ),
    components(schemas(
        error::ErrorResponse,
        routes::health::HealthCheckResponse,
        models::UploadedFile,
        models::SubmissionSummary,
        models::SubmissionStatus,
        models::AuditReport,
        models::ReportStatus,
        models::ReportSummary,
        models::SecurityCheck,
        models::CheckStatus,
        models::Severity,
        models::ReportMetadata,
        models::Chat,
        models::ChatMessage,
        models::ChatRole,
        models::ConversationTurn,
        handlers::upload::UploadResponse,
        handlers::upload::UploadListResponse,
        handlers::analysis::AnalysisResponse,
        handlers::analysis::PendingAnalysisResponse,
        handlers::audits::AuditListResponse,
        handlers::audits::VisibilityRequest,
        handlers::audits::VisibilityResponse,
        handlers::audits::SuccessResponse,
        handlers::market::MarketResponse,
        handlers::chats::ChatRequest,
        handlers::chats::ChatResponse,
        handlers::chats::CreateChatRequest,
        handlers::chats::ChatListResponse,
        handlers::chats::ChatDetailResponse,
    )),
    tags(
        (name = "health", description = "Dependency health"),
        (name = "upload", description = "Submit files for audit"),
        (name = "analysis", description = "Run and read security audits"),
        (name = "audits", description = "Audit history owned by the caller"),
        (name = "market", description = "Public audit reports"),
        (name = "chat", description = "Security assistant")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/upload",
            "/api/analysis/{id}",
            "/api/audits",
            "/api/audits/{id}",
            "/api/audits/{id}/visibility",
            "/api/audits/{id}/file",
            "/api/audits/export",
            "/api/market",
            "/api/chat",
            "/api/chats",
            "/api/chats/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
