//! Audit history: listing, deletion, visibility, download and export.

use crate::auth::{Caller, SignedIn};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::upload::{attachment_disposition, download_content_type};
use armorclaw_core::models::{Identity, Submission, SubmissionSummary};
use armorclaw_core::AppError;
use armorclaw_services::export::{export_filename, render, ExportFormat};
use armorclaw_storage::StorageError;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const AUDIT_LIST_LIMIT: i64 = 50;
const EXPORT_LIMIT: i64 = 10_000;

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditListResponse {
    pub audits: Vec<SubmissionSummary>,
    pub count: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VisibilityRequest {
    pub is_public: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VisibilityResponse {
    pub success: bool,
    pub is_public: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// `csv` (default) or `json`
    pub format: Option<String>,
}

/// Load a submission the caller owns: 404 when absent, 403 when owned by someone else.
async fn owned_submission(
    state: &AppState,
    id: Uuid,
    identity: &Identity,
) -> Result<Submission, AppError> {
    let submission = state
        .db
        .submissions
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Audit not found".to_string()))?;
    if !identity.owns(&submission.owner) {
        return Err(AppError::Forbidden("You do not own this audit".to_string()));
    }
    Ok(submission)
}

#[utoipa::path(
    get,
    path = "/api/audits",
    tag = "audits",
    responses(
        (status = 200, description = "Caller's 50 most recent audits", body = AuditListResponse),
        (status = 401, description = "Sign in required", body = ErrorResponse)
    )
)]
pub async fn list_audits(
    SignedIn(identity): SignedIn,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let audits: Vec<SubmissionSummary> = state
        .db
        .submissions
        .list_by_owner(&identity.owner_key(), AUDIT_LIST_LIMIT)
        .await?
        .into_iter()
        .map(SubmissionSummary::from)
        .collect();

    Ok(Json(AuditListResponse {
        count: audits.len(),
        audits,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/audits/{id}",
    tag = "audits",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Audit deleted", body = SuccessResponse),
        (status = 401, description = "Sign in required", body = ErrorResponse),
        (status = 403, description = "Caller does not own the audit", body = ErrorResponse),
        (status = 404, description = "Audit not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(submission_id = %id))]
pub async fn delete_audit(
    SignedIn(identity): SignedIn,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    owned_submission(&state, id, &identity).await?;

    let deleted = state
        .db
        .submissions
        .delete(id, &identity.owner_key())
        .await?
        .ok_or_else(|| AppError::NotFound("Audit not found".to_string()))?;

    // The row is gone; a leftover object is only logged.
    if let Err(e) = state.storage.delete(&deleted.storage_key).await {
        tracing::warn!(
            error = %e,
            key = %deleted.storage_key,
            "Failed to delete stored object for removed audit"
        );
    }

    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    patch,
    path = "/api/audits/{id}/visibility",
    tag = "audits",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = VisibilityRequest,
    responses(
        (status = 200, description = "Visibility updated", body = VisibilityResponse),
        (status = 401, description = "Sign in required", body = ErrorResponse),
        (status = 403, description = "Caller does not own the audit", body = ErrorResponse),
        (status = 404, description = "Audit not found", body = ErrorResponse)
    )
)]
pub async fn set_visibility(
    SignedIn(identity): SignedIn,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<VisibilityRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    owned_submission(&state, id, &identity).await?;

    let updated = state
        .db
        .submissions
        .set_visibility(id, &identity.owner_key(), request.is_public)
        .await?
        .ok_or_else(|| AppError::NotFound("Audit not found".to_string()))?;

    tracing::info!(submission_id = %id, is_public = updated.is_public, "Audit visibility changed");

    Ok(Json(VisibilityResponse {
        success: true,
        is_public: updated.is_public,
    }))
}

#[utoipa::path(
    get,
    path = "/api/audits/{id}/file",
    tag = "audits",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Stored file as an attachment", content_type = "application/octet-stream"),
        (status = 403, description = "Private audit owned by someone else", body = ErrorResponse),
        (status = 404, description = "Audit or stored file missing", body = ErrorResponse)
    )
)]
pub async fn download_audit_file(
    Caller(identity): Caller,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let submission = state
        .db
        .submissions
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Audit record not found".to_string()))?;

    if !submission.is_public && !identity.owns(&submission.owner) {
        return Err(AppError::Forbidden("Unauthorized to download this file".to_string()).into());
    }

    let data = state
        .storage
        .download(&submission.storage_key)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) => {
                HttpAppError(AppError::NotFound("File content missing from storage".to_string()))
            }
            other => HttpAppError::from(other),
        })?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                download_content_type(&submission.file_name).to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                attachment_disposition(&submission.file_name),
            ),
        ],
        data,
    ))
}

#[utoipa::path(
    get,
    path = "/api/audits/export",
    tag = "audits",
    params(ExportQuery),
    responses(
        (status = 200, description = "Audit history as a CSV or JSON attachment"),
        (status = 401, description = "Sign in required", body = ErrorResponse)
    )
)]
pub async fn export_audits(
    SignedIn(identity): SignedIn,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let format = ExportFormat::from_query(query.format.as_deref());
    let submissions = state
        .db
        .submissions
        .list_by_owner(&identity.owner_key(), EXPORT_LIMIT)
        .await?;
    let body = render(format, &submissions)?;
    let filename = export_filename(format, chrono::Utc::now().date_naive());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
