//! Application state and sub-state extractors.
//!
//! Handlers take `State<Arc<AppState>>`; the identity extractor only needs
//! [`SecurityConfig`] and pulls it out through `FromRef`.

use armorclaw_db::{ChatStore, SubmissionStore};
use armorclaw_services::{AnalysisService, ChatService, Storage, UploadIntake};
use axum::extract::FromRef;
use std::sync::Arc;

/// Session token verification and client IP settings.
#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub trusted_proxy_count: usize,
}

/// Stores behind the repositories; in-memory in tests.
#[derive(Clone)]
pub struct DbState {
    pub submissions: Arc<dyn SubmissionStore>,
    pub chats: Arc<dyn ChatStore>,
}

#[derive(Clone)]
pub struct AppState {
    pub security: SecurityConfig,
    pub db: DbState,
    pub storage: Arc<dyn Storage>,
    pub intake: UploadIntake,
    pub analysis: AnalysisService,
    pub chat: ChatService,
}

impl FromRef<Arc<AppState>> for SecurityConfig {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.security.clone()
    }
}

impl FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}
