use std::sync::Arc;

use armorclaw_core::{
    models::{AuditReport, Identity, Submission},
    AppError,
};
use armorclaw_db::SubmissionStore;
use armorclaw_storage::{Storage, StorageError};
use uuid::Uuid;

use super::auditor::SecurityAuditor;
use super::outcome::AnalysisOutcome;
use super::placeholder::{disclose, placeholder_report};
use crate::archive::flatten;

/// Report produced by a triggered analysis.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub report: AuditReport,
    /// True only when the report came from the AI collaborator.
    pub used_ai: bool,
}

/// What a read of the analysis returns.
#[derive(Debug, Clone)]
pub enum AnalysisView {
    Report(serde_json::Value),
    Pending,
}

fn fresh_placeholder(file_name: &str) -> AuditReport {
    placeholder_report(file_name, &mut rand::rng())
}

#[derive(Clone)]
pub struct AnalysisService {
    store: Arc<dyn SubmissionStore>,
    storage: Arc<dyn Storage>,
    auditor: Option<SecurityAuditor>,
    enable_mock_analysis: bool,
}

impl AnalysisService {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        storage: Arc<dyn Storage>,
        auditor: Option<SecurityAuditor>,
        enable_mock_analysis: bool,
    ) -> Self {
        Self {
            store,
            storage,
            auditor,
            enable_mock_analysis,
        }
    }

    async fn owned_submission(&self, id: Uuid, identity: &Identity) -> Result<Submission, AppError> {
        let submission = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Audit not found".to_string()))?;

        if !identity.owns(&submission.owner) {
            return Err(AppError::Forbidden(
                "You do not own this audit".to_string(),
            ));
        }

        Ok(submission)
    }

    async fn persist(&self, submission: &Submission, report: &AuditReport) -> Result<(), AppError> {
        let value = serde_json::to_value(report)?;
        self.store
            .record_analysis(submission.id, report.status.into(), report.score as i32, value)
            .await?
            .ok_or_else(|| AppError::NotFound("Audit not found".to_string()))?;
        Ok(())
    }

    /// Analyze a submission now and store the result on its row.
    #[tracing::instrument(skip(self, identity), fields(submission_id = %id))]
    pub async fn trigger(&self, id: Uuid, identity: &Identity) -> Result<AnalysisRun, AppError> {
        let submission = self.owned_submission(id, identity).await?;

        let run = match &self.auditor {
            None => {
                tracing::warn!("AI collaborator not configured, using placeholder analysis");
                AnalysisRun {
                    report: disclose(fresh_placeholder(&submission.file_name), None),
                    used_ai: false,
                }
            }
            Some(auditor) => {
                let outcome = match self.storage.download(&submission.storage_key).await {
                    Ok(data) => {
                        let input = flatten(&submission.file_name, &data);
                        auditor.audit(&submission.file_name, &input).await
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            key = %submission.storage_key,
                            "Stored file unavailable for analysis"
                        );
                        AnalysisOutcome::InputUnavailable(match e {
                            StorageError::NotFound(_) => "File not found in storage".to_string(),
                            other => format!("Storage error: {}", other),
                        })
                    }
                };

                match outcome {
                    AnalysisOutcome::Ok(report) => AnalysisRun {
                        report,
                        used_ai: true,
                    },
                    failed => {
                        let reason = failed.failure_reason();
                        tracing::warn!(
                            reason = reason.as_deref().unwrap_or_default(),
                            "AI analysis failed, falling back to placeholder"
                        );
                        AnalysisRun {
                            report: disclose(
                                fresh_placeholder(&submission.file_name),
                                reason.as_deref(),
                            ),
                            used_ai: false,
                        }
                    }
                }
            }
        };

        self.persist(&submission, &run.report).await?;

        tracing::info!(
            score = run.report.score,
            status = ?run.report.status,
            used_ai = run.used_ai,
            "Analysis stored"
        );

        Ok(run)
    }

    /// Stored report; otherwise a persisted placeholder when mock analysis is enabled.
    pub async fn fetch(&self, id: Uuid, identity: &Identity) -> Result<AnalysisView, AppError> {
        let submission = self.owned_submission(id, identity).await?;

        if let Some(report) = submission.report {
            return Ok(AnalysisView::Report(report));
        }

        if !self.enable_mock_analysis {
            return Ok(AnalysisView::Pending);
        }

        let report = fresh_placeholder(&submission.file_name);
        self.persist(&submission, &report).await?;
        Ok(AnalysisView::Report(serde_json::to_value(&report)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiClient;
    use crate::analysis::PLACEHOLDER_ANALYZER_VERSION;
    use armorclaw_core::models::{NewSubmission, SubmissionStatus};
    use armorclaw_core::ErrorMetadata;
    use armorclaw_db::InMemorySubmissionStore;
    use armorclaw_storage::{generate_storage_key, LocalStorage};
    use mockito::Matcher;
    use std::io::Write;
    use std::time::Duration;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: InMemorySubmissionStore,
        storage: Arc<dyn Storage>,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let storage: Arc<dyn Storage> = Arc::new(
                LocalStorage::new(dir.path(), "http://localhost/files".to_string())
                    .await
                    .unwrap(),
            );
            Self {
                _dir: dir,
                store: InMemorySubmissionStore::new(),
                storage,
            }
        }

        async fn submit(&self, identity: &Identity, name: &str, data: Vec<u8>) -> Uuid {
            let key = generate_storage_key(&identity.owner_key(), name);
            let size = data.len() as i64;
            self.storage
                .upload_with_key(&key, data, "application/octet-stream")
                .await
                .unwrap();
            self.store
                .insert(NewSubmission {
                    id: Uuid::new_v4(),
                    owner: identity.owner_key(),
                    file_name: name.to_string(),
                    content_type: "application/octet-stream".to_string(),
                    size_bytes: size,
                    storage_key: key,
                    sha256: String::new(),
                })
                .await
                .unwrap()
                .id
        }

        fn service(&self, auditor: Option<SecurityAuditor>, mock: bool) -> AnalysisService {
            AnalysisService::new(
                Arc::new(self.store.clone()),
                self.storage.clone(),
                auditor,
                mock,
            )
        }
    }

    fn auditor(url: String) -> SecurityAuditor {
        SecurityAuditor::new(
            AiClient::new("k", url, "glm-4-flash", Duration::from_secs(5)).unwrap(),
        )
    }

    fn anon() -> Identity {
        Identity::Anonymous {
            ip: "203.0.113.5".to_string(),
        }
    }

    fn completion(content: &str) -> String {
        serde_json::json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    fn project_zip() -> Vec<u8> {
        use zip::write::{FileOptions, ZipWriter};
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
            let options = FileOptions::default();
            zip.start_file("main.c", options).unwrap();
            zip.write_all(&[b'a'; 1024]).unwrap();
            zip.start_file("logo.png", options).unwrap();
            zip.write_all(&vec![0u8; 50 * 1024]).unwrap();
            zip.finish().unwrap();
        }
        buffer
    }

    #[tokio::test]
    async fn test_unconfigured_ai_uses_disclosed_placeholder() {
        let fx = Fixture::new().await;
        let id = fx.submit(&anon(), "tracer.c", b"int x;".to_vec()).await;

        let run = fx.service(None, false).trigger(id, &anon()).await.unwrap();
        assert!(!run.used_ai);
        assert_eq!(
            run.report.recommendations[0],
            "⚠️ AI analysis not configured, using placeholder"
        );

        let row = fx.store.get(id).await.unwrap().unwrap();
        assert_eq!(row.score, Some(run.report.score as i32));
        assert_ne!(row.status, SubmissionStatus::Pending);
        assert!(row.report.is_some());
    }

    #[tokio::test]
    async fn test_ai_report_is_stored() {
        let fx = Fixture::new().await;
        let id = fx.submit(&anon(), "bundle.zip", project_zip()).await;

        let mut server = mockito::Server::new_async().await;
        let report = r#"{"score": 64, "status": "failed", "summary": {"total_checks": 4, "passed": 2, "warnings": 1, "critical": 1}, "checks": [], "recommendations": ["Check map bounds"]}"#;
        let mock = server
            .mock("POST", "/v4/chat/completions")
            .match_body(Matcher::Regex(r"File: main\.c \(Size: 1024 bytes\)".to_string()))
            .with_status(200)
            .with_body(completion(&format!("```json\n{}\n```", report)))
            .create_async()
            .await;

        let service = fx.service(
            Some(auditor(format!("{}/v4/chat/completions", server.url()))),
            false,
        );
        let run = service.trigger(id, &anon()).await.unwrap();
        mock.assert_async().await;

        assert!(run.used_ai);
        assert_eq!(run.report.score, 64);
        let row = fx.store.get(id).await.unwrap().unwrap();
        assert_eq!(row.status, SubmissionStatus::Failed);
        assert_eq!(row.score, Some(64));
    }

    #[tokio::test]
    async fn test_network_error_falls_back_to_placeholder() {
        let fx = Fixture::new().await;
        let id = fx.submit(&anon(), "tracer.c", b"int x;".to_vec()).await;

        let service = fx.service(Some(auditor("http://127.0.0.1:1/v4".to_string())), false);
        let run = service.trigger(id, &anon()).await.unwrap();

        assert!(!run.used_ai);
        assert!(run.report.recommendations[0].starts_with("⚠️ AI analysis failed, using placeholder: "));
        assert_eq!(
            run.report.metadata.unwrap().analyzer_version,
            PLACEHOLDER_ANALYZER_VERSION
        );
    }

    #[tokio::test]
    async fn test_unparseable_answer_falls_back_to_placeholder() {
        let fx = Fixture::new().await;
        let id = fx.submit(&anon(), "tracer.c", b"int x;".to_vec()).await;

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(completion("Sorry, I cannot help with that."))
            .create_async()
            .await;

        let service = fx.service(Some(auditor(format!("{}/chat", server.url()))), false);
        let run = service.trigger(id, &anon()).await.unwrap();
        assert!(!run.used_ai);
        assert!(run.report.recommendations[0].contains("not a valid report"));
    }

    #[tokio::test]
    async fn test_ownership_and_missing_rows() {
        let fx = Fixture::new().await;
        let id = fx.submit(&anon(), "tracer.c", b"int x;".to_vec()).await;
        let service = fx.service(None, true);

        let stranger = Identity::Authenticated {
            user_id: "someone".to_string(),
        };
        let err = service.trigger(id, &stranger).await.unwrap_err();
        assert_eq!(err.http_status_code(), 403);

        let err = service.fetch(Uuid::new_v4(), &anon()).await.unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_missing_stored_object_falls_back_to_placeholder() {
        let fx = Fixture::new().await;
        let id = fx.submit(&anon(), "tracer.c", b"int x;".to_vec()).await;
        let row = fx.store.get(id).await.unwrap().unwrap();
        fx.storage.delete(&row.storage_key).await.unwrap();

        let service = fx.service(Some(auditor("http://127.0.0.1:1".to_string())), false);
        let run = service.trigger(id, &anon()).await.unwrap();
        assert!(!run.used_ai);
        assert_eq!(
            run.report.recommendations[0],
            "⚠️ AI analysis failed, using placeholder: File not found in storage"
        );

        let stored = fx.store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.score, Some(run.report.score as i32));
        assert!(stored.report.is_some());
    }

    #[tokio::test]
    async fn test_fetch_pending_or_mock() {
        let fx = Fixture::new().await;
        let id = fx.submit(&anon(), "tracer.c", b"int x;".to_vec()).await;

        let view = fx.service(None, false).fetch(id, &anon()).await.unwrap();
        assert!(matches!(view, AnalysisView::Pending));

        let view = fx.service(None, true).fetch(id, &anon()).await.unwrap();
        let AnalysisView::Report(first) = view else {
            panic!("expected report");
        };

        let AnalysisView::Report(second) = fx.service(None, false).fetch(id, &anon()).await.unwrap()
        else {
            panic!("expected stored report");
        };
        assert_eq!(first, second);
    }
}
