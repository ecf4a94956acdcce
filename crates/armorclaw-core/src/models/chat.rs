use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl Display for ChatRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for ChatRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(ChatRole::System),
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            _ => Err(anyhow::anyhow!("Invalid chat role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Chat {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub owner: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub chat_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "sqlx")]
impl sqlx::FromRow<'_, sqlx::postgres::PgRow> for ChatMessage {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(ChatMessage {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            role: row.try_get::<String, _>("role")?.parse().map_err(|e| {
                sqlx::Error::Decode(format!("Failed to parse role: {}", e).into())
            })?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// One turn of prior conversation supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ConversationTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Title for a chat created from its first message: the first 30 characters, `...` when cut.
pub fn chat_title_from_message(message: &str) -> String {
    const TITLE_CHARS: usize = 30;
    let mut title: String = message.chars().take(TITLE_CHARS).collect();
    if message.chars().count() > TITLE_CHARS {
        title.push_str("...");
    }
    title
}
