//! Assistant chat and saved conversations.

use crate::auth::{Caller, SignedIn};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use armorclaw_core::models::{Chat, ChatMessage, ConversationTurn};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
    pub chat_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    pub chat_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateChatRequest {
    pub title: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatListResponse {
    pub chats: Vec<Chat>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatDetailResponse {
    pub chat: Chat,
    pub messages: Vec<ChatMessage>,
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Message is required", body = ErrorResponse),
        (status = 502, description = "AI collaborator failed", body = ErrorResponse),
        (status = 503, description = "AI collaborator not configured", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(authenticated = caller.0.is_authenticated()))]
pub async fn send_message(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ChatRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let reply = state
        .chat
        .send(
            &caller.0,
            &request.message,
            &request.conversation_history,
            request.chat_id,
        )
        .await?;

    Ok(Json(ChatResponse {
        success: true,
        message: reply.message,
        chat_id: reply.chat_id,
        timestamp: reply.timestamp,
    }))
}

#[utoipa::path(
    get,
    path = "/api/chats",
    tag = "chat",
    responses(
        (status = 200, description = "Caller's 50 most recent chats", body = ChatListResponse),
        (status = 401, description = "Sign in required", body = ErrorResponse)
    )
)]
pub async fn list_chats(
    SignedIn(identity): SignedIn,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let chats = state.chat.list(&identity).await?;
    Ok(Json(ChatListResponse { chats }))
}

#[utoipa::path(
    post,
    path = "/api/chats",
    tag = "chat",
    request_body = CreateChatRequest,
    responses(
        (status = 201, description = "Chat created", body = Chat),
        (status = 401, description = "Sign in required", body = ErrorResponse)
    )
)]
pub async fn create_chat(
    SignedIn(identity): SignedIn,
    State(state): State<Arc<AppState>>,
    request: Option<Json<CreateChatRequest>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(request) = request.unwrap_or_default();
    let chat = state.chat.create(&identity, request.title.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

#[utoipa::path(
    get,
    path = "/api/chats/{id}",
    tag = "chat",
    params(("id" = Uuid, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Chat with its messages in order", body = ChatDetailResponse),
        (status = 401, description = "Sign in required", body = ErrorResponse),
        (status = 404, description = "Chat not found", body = ErrorResponse)
    )
)]
pub async fn get_chat(
    SignedIn(identity): SignedIn,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (chat, messages) = state.chat.get(&identity, id).await?;
    Ok(Json(ChatDetailResponse { chat, messages }))
}

#[utoipa::path(
    delete,
    path = "/api/chats/{id}",
    tag = "chat",
    params(("id" = Uuid, Path, description = "Chat ID")),
    responses(
        (status = 204, description = "Chat deleted"),
        (status = 401, description = "Sign in required", body = ErrorResponse),
        (status = 404, description = "Chat not found", body = ErrorResponse)
    )
)]
pub async fn delete_chat(
    SignedIn(identity): SignedIn,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.chat.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
