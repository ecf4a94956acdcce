//! Service wiring: builds [`AppState`] from configuration and its backing stores.

use crate::state::{AppState, DbState, SecurityConfig};
use anyhow::{Context, Result};
use armorclaw_core::Config;
use armorclaw_db::{ChatStore, SubmissionStore};
use armorclaw_services::{
    AiClient, AnalysisService, ChatService, FileValidator, QuotaLedger, SecurityAuditor, Storage,
    SubmissionRecorder, UploadIntake,
};
use std::sync::Arc;

pub fn initialize_services(
    config: &Config,
    submissions: Arc<dyn SubmissionStore>,
    chats: Arc<dyn ChatStore>,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let policy = config.intake_policy();

    let intake = UploadIntake::new(
        QuotaLedger::new(submissions.clone(), policy.clone()),
        FileValidator::new(policy),
        SubmissionRecorder::new(storage.clone(), submissions.clone()),
    );

    let ai_client =
        AiClient::from_config(config.ai()).context("Failed to initialize AI collaborator client")?;
    match &ai_client {
        Some(client) => tracing::info!(model = %client.model(), "AI collaborator configured"),
        None => tracing::warn!("AI_API_KEY not set: analysis uses placeholder reports, chat is disabled"),
    }

    let analysis = AnalysisService::new(
        submissions.clone(),
        storage.clone(),
        ai_client.clone().map(SecurityAuditor::new),
        config.enable_mock_analysis(),
    );
    let chat = ChatService::new(chats.clone(), ai_client);

    Ok(Arc::new(AppState {
        security: SecurityConfig {
            jwt_secret: config.jwt_secret().to_string(),
            trusted_proxy_count: config.trusted_proxy_count(),
        },
        db: DbState { submissions, chats },
        storage,
        intake,
        analysis,
        chat,
    }))
}
