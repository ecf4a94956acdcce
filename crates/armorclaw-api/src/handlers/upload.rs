use crate::auth::Caller;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;
use armorclaw_core::models::{SubmissionSummary, UploadedFile};
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Most recent submissions returned by the upload listing.
const LIST_LIMIT: i64 = 100;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub file: UploadedFile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadListResponse {
    pub files: Vec<SubmissionSummary>,
    pub count: usize,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "upload",
    request_body(content_type = "multipart/form-data", description = "Exactly one field named `file`"),
    responses(
        (status = 200, description = "File stored and submission recorded", body = UploadResponse),
        (status = 400, description = "Missing or empty file", body = ErrorResponse),
        (status = 413, description = "File exceeds the ceiling for the caller's class", body = ErrorResponse),
        (status = 415, description = "Neither type nor extension is allowed", body = ErrorResponse),
        (status = 429, description = "Upload limit reached", body = ErrorResponse),
        (status = 503, description = "Quota could not be verified", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(owner = %caller.0.owner_key(), class = %caller.0.class()))]
pub async fn upload_file(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let candidate = extract_multipart_file(multipart).await?;
    let file = state.intake.accept(&caller.0, candidate).await?;

    Ok(Json(UploadResponse {
        success: true,
        file,
    }))
}

#[utoipa::path(
    get,
    path = "/api/upload",
    tag = "upload",
    responses(
        (status = 200, description = "Caller's submissions, most recent first", body = UploadListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_uploads(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let files: Vec<SubmissionSummary> = state
        .db
        .submissions
        .list_by_owner(&caller.0.owner_key(), LIST_LIMIT)
        .await?
        .into_iter()
        .map(SubmissionSummary::from)
        .collect();

    Ok(Json(UploadListResponse {
        count: files.len(),
        files,
    }))
}
