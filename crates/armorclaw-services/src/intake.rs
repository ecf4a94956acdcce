//! Upload intake pipeline: quota, then validation, then recording.

use armorclaw_core::{
    models::{Identity, UploadedFile},
    AppError,
};

use crate::quota::QuotaLedger;
use crate::recorder::SubmissionRecorder;
use crate::validator::FileValidator;

/// A file received from the client, before any checks.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct UploadIntake {
    ledger: QuotaLedger,
    validator: FileValidator,
    recorder: SubmissionRecorder,
}

impl UploadIntake {
    pub fn new(ledger: QuotaLedger, validator: FileValidator, recorder: SubmissionRecorder) -> Self {
        Self {
            ledger,
            validator,
            recorder,
        }
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    /// Run the pipeline. Nothing is written unless quota and validation both pass.
    pub async fn accept(
        &self,
        identity: &Identity,
        candidate: UploadCandidate,
    ) -> Result<UploadedFile, AppError> {
        self.ledger.ensure_can_submit(identity).await?;

        self.validator.validate(
            identity.class(),
            candidate.data.len() as u64,
            &candidate.content_type,
            &candidate.file_name,
        )?;

        let recorded = self
            .recorder
            .record(
                identity,
                &candidate.file_name,
                &candidate.content_type,
                candidate.data,
            )
            .await?;

        Ok(recorded.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armorclaw_core::{models::NewSubmission, ErrorMetadata, IntakePolicy};
    use armorclaw_db::{InMemorySubmissionStore, SubmissionStore};
    use armorclaw_storage::{LocalStorage, Storage};
    use std::sync::Arc;
    use uuid::Uuid;

    async fn intake(dir: &tempfile::TempDir, store: &InMemorySubmissionStore) -> UploadIntake {
        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(dir.path(), "http://localhost/files".to_string())
                .await
                .unwrap(),
        );
        let store: Arc<dyn SubmissionStore> = Arc::new(store.clone());
        let policy = IntakePolicy::default();
        UploadIntake::new(
            QuotaLedger::new(store.clone(), policy.clone()),
            FileValidator::new(policy),
            SubmissionRecorder::new(storage, store),
        )
    }

    fn stored_files(dir: &tempfile::TempDir) -> usize {
        fn walk(path: &std::path::Path) -> usize {
            std::fs::read_dir(path)
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|e| {
                            let p = e.path();
                            if p.is_dir() {
                                walk(&p)
                            } else {
                                1
                            }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        walk(dir.path())
    }

    #[tokio::test]
    async fn test_eleventh_authenticated_upload_rejected_without_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemorySubmissionStore::new();
        for i in 0..10 {
            store
                .insert(NewSubmission {
                    id: Uuid::new_v4(),
                    owner: "u1".to_string(),
                    file_name: format!("{}.c", i),
                    content_type: "text/x-c".to_string(),
                    size_bytes: 1,
                    storage_key: format!("seed/{}", i),
                    sha256: String::new(),
                })
                .await
                .unwrap();
        }
        let intake = intake(&dir, &store).await;
        let identity = Identity::Authenticated {
            user_id: "u1".to_string(),
        };

        let err = intake
            .accept(
                &identity,
                UploadCandidate {
                    file_name: "eleventh.c".to_string(),
                    content_type: "text/x-c".to_string(),
                    data: vec![b'a'; 1024],
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::QuotaExceeded { used: 10, limit: 10, .. }));
        assert!(err.client_message().contains("Upload limit reached"));
        assert_eq!(stored_files(&dir), 0);
        assert_eq!(store.len(), 10);
    }

    #[tokio::test]
    async fn test_invalid_file_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemorySubmissionStore::new();
        let intake = intake(&dir, &store).await;
        let identity = Identity::Anonymous {
            ip: "192.0.2.1".to_string(),
        };

        let err = intake
            .accept(
                &identity,
                UploadCandidate {
                    file_name: "logo.png".to_string(),
                    content_type: "image/png".to_string(),
                    data: vec![1; 10],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 415);
        assert_eq!(stored_files(&dir), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_first_upload_accepted_second_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemorySubmissionStore::new();
        let intake = intake(&dir, &store).await;
        let identity = Identity::Anonymous {
            ip: "192.0.2.1".to_string(),
        };
        let candidate = UploadCandidate {
            file_name: "bundle.zip".to_string(),
            content_type: "application/zip".to_string(),
            data: vec![0x50, 0x4B, 0x03, 0x04, 0, 0],
        };

        let file = intake.accept(&identity, candidate.clone()).await.unwrap();
        assert_eq!(file.name, "bundle.zip");
        assert_eq!(file.content_type, "application/zip");

        let err = intake.accept(&identity, candidate).await.unwrap_err();
        assert_eq!(err.http_status_code(), 429);
        assert_eq!(stored_files(&dir), 1);
    }
}
