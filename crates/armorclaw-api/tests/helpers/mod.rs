//! Test helpers: build the router over in-memory stores and local storage.
//!
//! Run with `cargo test -p armorclaw-api`. No database or network is needed; the AI
//! collaborator is either unset or a mockito server.

#![allow(dead_code)]

use armorclaw_api::auth::SessionClaims;
use armorclaw_api::setup::{routes, services};
use armorclaw_core::config::{DEFAULT_AI_API_URL, DEFAULT_AI_MODEL};
use armorclaw_core::{AiConfig, AppConfig, BaseConfig, Config, IntakePolicy, StorageBackend};
use armorclaw_db::{InMemoryChatStore, InMemorySubmissionStore};
use armorclaw_services::{LocalStorage, Storage};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const JWT_SECRET: &str = "integration-test-secret-with-32-plus-chars";

pub struct TestApp {
    pub server: TestServer,
    pub submissions: InMemorySubmissionStore,
    pub chats: InMemoryChatStore,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Objects written to the local content store.
    pub fn stored_object_count(&self) -> usize {
        count_files(self.temp_dir.path())
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| {
                    let path = entry.path();
                    if path.is_dir() {
                        count_files(&path)
                    } else {
                        1
                    }
                })
                .sum()
        })
        .unwrap_or(0)
}

pub fn test_config(storage_path: &Path, ai_url: Option<String>, enable_mock_analysis: bool) -> Config {
    Config::new(AppConfig {
        base: BaseConfig {
            server_port: 3000,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 5,
            db_timeout_seconds: 5,
            jwt_secret: JWT_SECRET.to_string(),
            environment: "test".to_string(),
            trusted_proxy_count: 1,
            log_format: "compact".to_string(),
        },
        database_url: "postgres://localhost/armorclaw_test".to_string(),
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: Some(storage_path.display().to_string()),
        local_storage_base_url: Some("http://localhost:3000/files".to_string()),
        intake: IntakePolicy::default(),
        ai: AiConfig {
            api_key: ai_url.as_ref().map(|_| "test-key".to_string()),
            api_url: ai_url.unwrap_or_else(|| DEFAULT_AI_API_URL.to_string()),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout_secs: 5,
        },
        enable_mock_analysis,
    })
}

async fn build(ai_url: Option<String>, enable_mock_analysis: bool) -> TestApp {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = test_config(temp_dir.path(), ai_url, enable_mock_analysis);

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(temp_dir.path(), "http://localhost:3000/files".to_string())
            .await
            .unwrap(),
    );
    let submissions = InMemorySubmissionStore::new();
    let chats = InMemoryChatStore::new();

    let state = services::initialize_services(
        &config,
        Arc::new(submissions.clone()),
        Arc::new(chats.clone()),
        storage,
    )
    .unwrap();
    let router = routes::setup_routes(&config, state).unwrap();

    TestApp {
        server: TestServer::new(router).unwrap(),
        submissions,
        chats,
        temp_dir,
    }
}

/// App without an AI collaborator and without mock analysis on GET.
pub async fn setup_test_app() -> TestApp {
    build(None, false).await
}

/// App whose AI collaborator lives at `ai_url`.
pub async fn setup_test_app_with_ai(ai_url: String) -> TestApp {
    build(Some(ai_url), false).await
}

pub async fn setup_test_app_with_mock_analysis() -> TestApp {
    build(None, true).await
}

pub fn session_token(user_id: &str) -> String {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
        iat: Some(chrono::Utc::now().timestamp()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", session_token(user_id))
}

pub fn upload_form(file_name: &str, content_type: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_type(content_type.to_string()),
    )
}

pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Chat-completions body whose first choice carries `content`.
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

pub fn sample_report_json() -> String {
    serde_json::json!({
        "score": 93,
        "status": "passed",
        "summary": {"total_checks": 4, "passed": 4, "warnings": 0, "critical": 0},
        "checks": [
            {"category": "Memory Safety", "status": "passed", "details": "Bounds checked", "severity": "info"}
        ],
        "recommendations": ["Keep map sizes bounded"]
    })
    .to_string()
}
