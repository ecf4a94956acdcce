use armorclaw_core::models::ChatRole;

use super::outcome::{parse_report, AnalysisOutcome};
use crate::ai::prompt::{build_audit_prompt, AUDIT_SYSTEM_PROMPT};
use crate::ai::{AiClient, CompletionMessage, CompletionOptions};
use crate::archive::ProjectInput;

const AUDIT_TEMPERATURE: f32 = 0.3;
const AUDIT_MAX_TOKENS: u32 = 8192;

/// Sends flattened projects to the AI collaborator and classifies the answer.
#[derive(Debug, Clone)]
pub struct SecurityAuditor {
    client: AiClient,
}

impl SecurityAuditor {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }

    pub async fn audit(&self, project_name: &str, input: &ProjectInput) -> AnalysisOutcome {
        let messages = [
            CompletionMessage::new(ChatRole::System, AUDIT_SYSTEM_PROMPT),
            CompletionMessage::new(
                ChatRole::User,
                build_audit_prompt(project_name, input.files()),
            ),
        ];
        let options = CompletionOptions {
            temperature: Some(AUDIT_TEMPERATURE),
            max_tokens: Some(AUDIT_MAX_TOKENS),
            thinking: true,
        };

        match self.client.complete(&messages, options).await {
            Ok(raw) => parse_report(&raw, project_name),
            Err(e) => {
                tracing::warn!(error = %e, model = %self.client.model(), "AI audit request failed");
                AnalysisOutcome::UpstreamError(format!("{:#}", e))
            }
        }
    }
}
