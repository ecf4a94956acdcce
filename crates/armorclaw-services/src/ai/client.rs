//! Chat-completions client for the AI collaborator (GLM-compatible API).

use anyhow::{Context, Result};
use armorclaw_core::{models::ChatRole, AiConfig};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionMessage {
    pub role: ChatRole,
    pub content: String,
}

impl CompletionMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Sampling options for one request. `None` leaves the provider default.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub thinking: bool,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [CompletionMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<Thinking>,
}

#[derive(Debug, Serialize)]
struct Thinking {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct AiClient {
    http_client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl Debug for AiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AiClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

impl AiClient {
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for AI collaborator")?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            api_url: api_url.into(),
            model: model.into(),
        })
    }

    /// Client for the configured provider, or `None` when no API key is set.
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>> {
        match &config.api_key {
            Some(key) => Ok(Some(Self::new(
                key.clone(),
                config.api_url.clone(),
                config.model.clone(),
                Duration::from_secs(config.timeout_secs),
            )?)),
            None => Ok(None),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the conversation and return the first choice's text.
    pub async fn complete(
        &self,
        messages: &[CompletionMessage],
        options: CompletionOptions,
    ) -> Result<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            thinking: options.thinking.then_some(Thinking { kind: "enabled" }),
        };

        let start = std::time::Instant::now();
        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to AI collaborator")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "AI API request failed: {} - {}",
                status,
                error_text
            ));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse AI API response")?;

        tracing::debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "AI completion received"
        );

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("AI API returned empty content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::Server) -> AiClient {
        AiClient::new(
            "test-key",
            format!("{}/chat/completions", server.url()),
            "glm-4-flash",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_sends_bearer_and_options() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "glm-4-flash",
                "temperature": 0.3,
                "max_tokens": 8192,
                "thinking": {"type": "enabled"},
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"hello"}}]}"#)
            .create_async()
            .await;

        let reply = client(&server)
            .complete(
                &[CompletionMessage::new(ChatRole::User, "hi")],
                CompletionOptions {
                    temperature: Some(0.3),
                    max_tokens: Some(8192),
                    thinking: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(reply, "hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = client(&server)
            .complete(
                &[CompletionMessage::new(ChatRole::User, "hi")],
                CompletionOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        assert!(client(&server)
            .complete(
                &[CompletionMessage::new(ChatRole::User, "hi")],
                CompletionOptions::default(),
            )
            .await
            .is_err());
    }

    #[test]
    fn test_from_config_without_key() {
        let config = AiConfig {
            api_key: None,
            api_url: "http://localhost".to_string(),
            model: "m".to_string(),
            timeout_secs: 1,
        };
        assert!(AiClient::from_config(&config).unwrap().is_none());
    }
}
