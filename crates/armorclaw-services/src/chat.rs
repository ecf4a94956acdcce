//! Assistant chat: forwards the conversation to the AI collaborator and keeps history for
//! authenticated callers.

use std::sync::Arc;

use armorclaw_core::{
    models::{chat_title_from_message, Chat, ChatMessage, ChatRole, ConversationTurn, Identity},
    AppError,
};
use armorclaw_db::ChatStore;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ai::prompt::CHAT_SYSTEM_PROMPT;
use crate::ai::{AiClient, CompletionMessage, CompletionOptions};

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";
pub const CHAT_LIST_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub message: String,
    /// Chat the exchange was saved to; `None` for anonymous callers or when saving failed.
    pub chat_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    client: Option<AiClient>,
}

impl ChatService {
    pub fn new(store: Arc<dyn ChatStore>, client: Option<AiClient>) -> Self {
        Self { store, client }
    }

    pub async fn send(
        &self,
        identity: &Identity,
        message: &str,
        history: &[ConversationTurn],
        chat_id: Option<Uuid>,
    ) -> Result<ChatReply, AppError> {
        if message.trim().is_empty() {
            return Err(AppError::BadRequest("Message is required".to_string()));
        }

        let client = self.client.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable(
                "AI service not configured. Set AI_API_KEY to enable chat.".to_string(),
            )
        })?;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(CompletionMessage::new(ChatRole::System, CHAT_SYSTEM_PROMPT));
        messages.extend(
            history
                .iter()
                .filter(|turn| turn.role != ChatRole::System)
                .map(|turn| CompletionMessage::new(turn.role, turn.content.clone())),
        );
        messages.push(CompletionMessage::new(ChatRole::User, message));

        let answer = client
            .complete(&messages, CompletionOptions::default())
            .await
            .map_err(|e| {
                tracing::error!(error = %format!("{:#}", e), "Chat completion failed");
                AppError::Upstream("Failed to process chat message".to_string())
            })?;

        let chat_id = match identity.user_id() {
            Some(_) => self.save_exchange(identity, chat_id, message, &answer).await,
            None => chat_id,
        };

        Ok(ChatReply {
            message: answer,
            chat_id,
            timestamp: Utc::now(),
        })
    }

    /// Persist both turns. Failures are logged and never reach the caller.
    async fn save_exchange(
        &self,
        identity: &Identity,
        chat_id: Option<Uuid>,
        message: &str,
        answer: &str,
    ) -> Option<Uuid> {
        let owner = identity.owner_key();
        let result: Result<Uuid, AppError> = async {
            let existing = match chat_id {
                Some(id) => self.store.get_chat(id, &owner).await?.map(|chat| chat.id),
                None => None,
            };
            let id = match existing {
                Some(id) => id,
                None => {
                    self.store
                        .create_chat(&owner, &chat_title_from_message(message))
                        .await?
                        .id
                }
            };
            self.store.append_message(id, ChatRole::User, message).await?;
            self.store
                .append_message(id, ChatRole::Assistant, answer)
                .await?;
            Ok(id)
        }
        .await;

        match result {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(error = %e, "Failed to save chat history");
                chat_id
            }
        }
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<Chat>, AppError> {
        self.store
            .list_chats(&identity.owner_key(), CHAT_LIST_LIMIT)
            .await
    }

    pub async fn create(&self, identity: &Identity, title: Option<&str>) -> Result<Chat, AppError> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CHAT_TITLE);
        self.store.create_chat(&identity.owner_key(), title).await
    }

    pub async fn get(
        &self,
        identity: &Identity,
        id: Uuid,
    ) -> Result<(Chat, Vec<ChatMessage>), AppError> {
        let chat = self
            .store
            .get_chat(id, &identity.owner_key())
            .await?
            .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;
        let messages = self.store.list_messages(chat.id).await?;
        Ok((chat, messages))
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<(), AppError> {
        if self.store.delete_chat(id, &identity.owner_key()).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Chat not found".to_string()))
        }
    }
}
