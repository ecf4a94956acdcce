use crate::auth::Caller;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use armorclaw_core::models::AuditReport;
use armorclaw_services::AnalysisView;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub success: bool,
    pub result: AuditReport,
    /// False when the report is a locally generated placeholder.
    pub used_ai: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingAnalysisResponse {
    pub status: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/analysis/{id}",
    tag = "analysis",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Report stored on the submission; a disclosed placeholder when the AI or the stored file is unavailable", body = AnalysisResponse),
        (status = 403, description = "Caller does not own the submission", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(submission_id = %id))]
pub async fn run_analysis(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let run = state.analysis.trigger(id, &caller.0).await?;

    Ok(Json(AnalysisResponse {
        success: true,
        result: run.report,
        used_ai: run.used_ai,
    }))
}

#[utoipa::path(
    get,
    path = "/api/analysis/{id}",
    tag = "analysis",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Stored report, or pending status", body = AuditReport),
        (status = 403, description = "Caller does not own the submission", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    )
)]
pub async fn get_analysis(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, HttpAppError> {
    let response = match state.analysis.fetch(id, &caller.0).await? {
        AnalysisView::Report(report) => Json(report).into_response(),
        AnalysisView::Pending => Json(PendingAnalysisResponse {
            status: "pending".to_string(),
            message: "Analysis pending or not started".to_string(),
        })
        .into_response(),
    };
    Ok(response)
}
