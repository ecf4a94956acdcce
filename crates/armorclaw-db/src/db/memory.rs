//! In-memory store implementations for testing
//!
//! These stores let services and handlers run without a database. `set_unavailable(true)`
//! makes every call fail with a database-style error.

use super::{ChatStore, SubmissionStore};
use armorclaw_core::{
    models::{Chat, ChatMessage, ChatRole, NewSubmission, Submission, SubmissionStatus},
    AppError,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn unavailable() -> AppError {
    AppError::Database(sqlx::Error::PoolTimedOut)
}

/// Submission store kept in insertion order.
#[derive(Clone, Default)]
pub struct InMemorySubmissionStore {
    rows: Arc<Mutex<Vec<Submission>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Insert a fully formed row, bypassing the pending-status default.
    pub fn seed(&self, submission: Submission) {
        self.rows.lock().unwrap().push(submission);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn count_by_owner(&self, owner: &str) -> Result<i64, AppError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|s| s.owner == owner).count() as i64)
    }

    async fn insert(&self, new: NewSubmission) -> Result<Submission, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|s| s.id == new.id || s.storage_key == new.storage_key)
        {
            return Err(AppError::Internal(
                "duplicate submission id or storage key".to_string(),
            ));
        }
        let submission = Submission {
            id: new.id,
            owner: new.owner,
            file_name: new.file_name,
            content_type: new.content_type,
            size_bytes: new.size_bytes,
            storage_key: new.storage_key,
            sha256: new.sha256,
            status: SubmissionStatus::Pending,
            score: None,
            is_public: false,
            report: None,
            created_at: Utc::now(),
            analyzed_at: None,
        };
        rows.push(submission.clone());
        Ok(submission)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn list_by_owner(&self, owner: &str, limit: i64) -> Result<Vec<Submission>, AppError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|s| s.owner == owner)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_public(
        &self,
        name_filter: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Submission>, AppError> {
        self.check()?;
        let needle = name_filter
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|s| s.is_public)
            .filter(|s| match &needle {
                Some(q) => s.file_name.to_lowercase().contains(q.as_str()),
                None => true,
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn record_analysis(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        score: i32,
        report: serde_json::Value,
    ) -> Result<Option<Submission>, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|s| s.id == id).map(|s| {
            s.status = status;
            s.score = Some(score);
            s.report = Some(report);
            s.analyzed_at = Some(Utc::now());
            s.clone()
        }))
    }

    async fn set_visibility(
        &self,
        id: Uuid,
        owner: &str,
        is_public: bool,
    ) -> Result<Option<Submission>, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|s| s.id == id && s.owner == owner)
            .map(|s| {
                s.is_public = is_public;
                s.clone()
            }))
    }

    async fn delete(&self, id: Uuid, owner: &str) -> Result<Option<Submission>, AppError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .position(|s| s.id == id && s.owner == owner)
            .map(|index| rows.remove(index)))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryChatStore {
    chats: Arc<Mutex<Vec<Chat>>>,
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn chat_count(&self) -> usize {
        self.chats.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn create_chat(&self, owner: &str, title: &str) -> Result<Chat, AppError> {
        self.check()?;
        let chat = Chat {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            title: title.to_string(),
            created_at: Utc::now(),
        };
        self.chats.lock().unwrap().push(chat.clone());
        Ok(chat)
    }

    async fn list_chats(&self, owner: &str, limit: i64) -> Result<Vec<Chat>, AppError> {
        self.check()?;
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|c| c.owner == owner)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get_chat(&self, id: Uuid, owner: &str) -> Result<Option<Chat>, AppError> {
        self.check()?;
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && c.owner == owner)
            .cloned())
    }

    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>, AppError> {
        self.check()?;
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect())
    }

    async fn append_message(
        &self,
        chat_id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage, AppError> {
        self.check()?;
        if !self.chats.lock().unwrap().iter().any(|c| c.id == chat_id) {
            return Err(AppError::NotFound(format!("Chat {} not found", chat_id)));
        }
        let message = ChatMessage {
            id: Uuid::new_v4(),
            chat_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn delete_chat(&self, id: Uuid, owner: &str) -> Result<bool, AppError> {
        self.check()?;
        let mut chats = self.chats.lock().unwrap();
        let Some(index) = chats.iter().position(|c| c.id == id && c.owner == owner) else {
            return Ok(false);
        };
        chats.remove(index);
        self.messages.lock().unwrap().retain(|m| m.chat_id != id);
        Ok(true)
    }
}
