use armorclaw_core::{
    models::{Chat, ChatMessage, ChatRole},
    AppError,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Persistence for assistant conversations. Chats are owner-scoped; messages are read in
/// insertion order.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_chat(&self, owner: &str, title: &str) -> Result<Chat, AppError>;

    /// Most recent first.
    async fn list_chats(&self, owner: &str, limit: i64) -> Result<Vec<Chat>, AppError>;

    async fn get_chat(&self, id: Uuid, owner: &str) -> Result<Option<Chat>, AppError>;

    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>, AppError>;

    async fn append_message(
        &self,
        chat_id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage, AppError>;

    /// Returns false when nothing matched.
    async fn delete_chat(&self, id: Uuid, owner: &str) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStore for ChatRepository {
    #[tracing::instrument(skip(self), fields(db.table = "chats", db.operation = "insert"))]
    async fn create_chat(&self, owner: &str, title: &str) -> Result<Chat, AppError> {
        let chat = sqlx::query_as::<Postgres, Chat>(
            r#"
            INSERT INTO chats (id, owner, title)
            VALUES ($1, $2, $3)
            RETURNING id, owner, title, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        Ok(chat)
    }

    #[tracing::instrument(skip(self), fields(db.table = "chats", db.operation = "select"))]
    async fn list_chats(&self, owner: &str, limit: i64) -> Result<Vec<Chat>, AppError> {
        let chats = sqlx::query_as::<Postgres, Chat>(
            "SELECT id, owner, title, created_at FROM chats WHERE owner = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(chats)
    }

    #[tracing::instrument(skip(self), fields(db.table = "chats", db.operation = "select", db.record_id = %id))]
    async fn get_chat(&self, id: Uuid, owner: &str) -> Result<Option<Chat>, AppError> {
        let chat = sqlx::query_as::<Postgres, Chat>(
            "SELECT id, owner, title, created_at FROM chats WHERE id = $1 AND owner = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chat)
    }

    #[tracing::instrument(skip(self), fields(db.table = "messages", db.operation = "select"))]
    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>, AppError> {
        let messages = sqlx::query_as::<Postgres, ChatMessage>(
            "SELECT id, chat_id, role, content, created_at FROM messages WHERE chat_id = $1 ORDER BY created_at ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    #[tracing::instrument(skip(self, content), fields(db.table = "messages", db.operation = "insert"))]
    async fn append_message(
        &self,
        chat_id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage, AppError> {
        let message = sqlx::query_as::<Postgres, ChatMessage>(
            r#"
            INSERT INTO messages (id, chat_id, role, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, chat_id, role, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(chat_id)
        .bind(role.to_string())
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    #[tracing::instrument(skip(self), fields(db.table = "chats", db.operation = "delete", db.record_id = %id))]
    async fn delete_chat(&self, id: Uuid, owner: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
