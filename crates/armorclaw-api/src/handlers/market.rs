use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use armorclaw_core::models::SubmissionSummary;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

const MARKET_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct MarketQuery {
    /// Case-insensitive substring of the skill name
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarketResponse {
    pub skills: Vec<SubmissionSummary>,
    pub count: usize,
}

#[utoipa::path(
    get,
    path = "/api/market",
    tag = "market",
    params(MarketQuery),
    responses(
        (status = 200, description = "Public audits, most recent first", body = MarketResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_market(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MarketQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let skills: Vec<SubmissionSummary> = state
        .db
        .submissions
        .list_public(filter, MARKET_LIMIT)
        .await?
        .into_iter()
        .map(SubmissionSummary::from)
        .collect();

    Ok(Json(MarketResponse {
        count: skills.len(),
        skills,
    }))
}
