//! Submission Recorder
//!
//! Writes the artifact to the content store, then appends the submission row. The two
//! writes are not transactional: when the row insert fails after the object was stored the
//! object is left unindexed, logged at error with its key, and the upload still succeeds.

use std::sync::Arc;

use armorclaw_core::{
    models::{Identity, NewSubmission, UploadedFile},
    AppError,
};
use armorclaw_db::SubmissionStore;
use armorclaw_storage::{generate_storage_key, Storage};
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Result of recording one upload.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub file: UploadedFile,
    /// False when the object was stored but the row insert failed.
    pub indexed: bool,
}

#[derive(Clone)]
pub struct SubmissionRecorder {
    storage: Arc<dyn Storage>,
    store: Arc<dyn SubmissionStore>,
}

impl SubmissionRecorder {
    pub fn new(storage: Arc<dyn Storage>, store: Arc<dyn SubmissionStore>) -> Self {
        Self { storage, store }
    }

    pub async fn record(
        &self,
        identity: &Identity,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<RecordedSubmission, AppError> {
        let id = Uuid::new_v4();
        let owner = identity.owner_key();
        let storage_key = generate_storage_key(&owner, file_name);
        let size_bytes = data.len() as i64;
        let sha256 = hex::encode(Sha256::digest(&data));

        self.storage
            .upload_with_key(&storage_key, data, content_type)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %storage_key, "Failed to store uploaded file");
                AppError::Storage(e.to_string())
            })?;

        let new = NewSubmission {
            id,
            owner,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size_bytes,
            storage_key: storage_key.clone(),
            sha256,
        };

        let (uploaded_at, indexed) = match self.store.insert(new).await {
            Ok(row) => (row.created_at, true),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    submission_id = %id,
                    key = %storage_key,
                    "Stored object is not indexed: submission insert failed"
                );
                (Utc::now(), false)
            }
        };

        tracing::info!(
            submission_id = %id,
            key = %storage_key,
            size_bytes = size_bytes,
            class = %identity.class(),
            "Submission recorded"
        );

        Ok(RecordedSubmission {
            file: UploadedFile {
                id,
                name: file_name.to_string(),
                size: size_bytes,
                content_type: content_type.to_string(),
                key: storage_key,
                uploaded_at,
            },
            indexed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armorclaw_core::models::SubmissionStatus;
    use armorclaw_db::InMemorySubmissionStore;
    use armorclaw_storage::LocalStorage;

    async fn recorder(
        dir: &tempfile::TempDir,
        store: &InMemorySubmissionStore,
    ) -> (SubmissionRecorder, Arc<dyn Storage>) {
        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(dir.path(), "http://localhost/files".to_string())
                .await
                .unwrap(),
        );
        (
            SubmissionRecorder::new(storage.clone(), Arc::new(store.clone())),
            storage,
        )
    }

    #[tokio::test]
    async fn test_record_writes_object_then_pending_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemorySubmissionStore::new();
        let (recorder, storage) = recorder(&dir, &store).await;
        let identity = Identity::Authenticated {
            user_id: "u1".to_string(),
        };

        let recorded = recorder
            .record(&identity, "tracer.c", "text/x-c", b"int x;".to_vec())
            .await
            .unwrap();
        assert!(recorded.indexed);
        assert_eq!(recorded.file.size, 6);
        assert!(recorded.file.key.starts_with("submissions/u1/"));
        assert!(recorded.file.key.ends_with(".c"));

        assert_eq!(storage.download(&recorded.file.key).await.unwrap(), b"int x;");

        let row = store.get(recorded.file.id).await.unwrap().unwrap();
        assert_eq!(row.status, SubmissionStatus::Pending);
        assert_eq!(row.owner, "u1");
        assert_eq!(row.score, None);
        assert!(!row.is_public);
        assert_eq!(row.sha256.len(), 64);
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_orphan_but_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemorySubmissionStore::new();
        let (recorder, storage) = recorder(&dir, &store).await;
        store.set_unavailable(true);

        let identity = Identity::Anonymous {
            ip: "192.0.2.9".to_string(),
        };
        let recorded = recorder
            .record(&identity, "a.txt", "text/plain", b"hello".to_vec())
            .await
            .unwrap();

        assert!(!recorded.indexed);
        assert!(storage.exists(&recorded.file.key).await.unwrap());
        store.set_unavailable(false);
        assert!(store.is_empty());
    }
}
