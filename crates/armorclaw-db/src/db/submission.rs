use armorclaw_core::{
    models::{NewSubmission, Submission, SubmissionStatus},
    AppError,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const SUBMISSION_COLUMNS: &str = "id, owner, file_name, content_type, size_bytes, storage_key, sha256, \
     status, score, is_public, report, created_at, analyzed_at";

/// Persistence for submissions.
///
/// Owner-scoped mutations take the caller's owner key and match nothing when it differs,
/// so a `None`/`false` result covers both "missing" and "not yours".
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Number of submissions owned by `owner` (the quota counter).
    async fn count_by_owner(&self, owner: &str) -> Result<i64, AppError>;

    async fn insert(&self, new: NewSubmission) -> Result<Submission, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, AppError>;

    /// Most recent first.
    async fn list_by_owner(&self, owner: &str, limit: i64) -> Result<Vec<Submission>, AppError>;

    /// Public submissions, most recent first, optionally filtered by a case-insensitive
    /// substring of the file name.
    async fn list_public(
        &self,
        name_filter: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Submission>, AppError>;

    /// Store an analysis result on the row.
    async fn record_analysis(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        score: i32,
        report: serde_json::Value,
    ) -> Result<Option<Submission>, AppError>;

    async fn set_visibility(
        &self,
        id: Uuid,
        owner: &str,
        is_public: bool,
    ) -> Result<Option<Submission>, AppError>;

    /// Delete the row and return it so the caller can remove the stored object.
    async fn delete(&self, id: Uuid, owner: &str) -> Result<Option<Submission>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Postgres-backed submission store
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for SubmissionRepository {
    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "count"))]
    async fn count_by_owner(&self, owner: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM submissions WHERE owner = $1",
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "submissions", db.operation = "insert", db.record_id = %new.id))]
    async fn insert(&self, new: NewSubmission) -> Result<Submission, AppError> {
        let query = format!(
            r#"
            INSERT INTO submissions (id, owner, file_name, content_type, size_bytes, storage_key, sha256, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );

        let submission = sqlx::query_as::<Postgres, Submission>(&query)
            .bind(new.id)
            .bind(&new.owner)
            .bind(&new.file_name)
            .bind(&new.content_type)
            .bind(new.size_bytes)
            .bind(&new.storage_key)
            .bind(&new.sha256)
            .fetch_one(&self.pool)
            .await?;

        Ok(submission)
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let query = format!("SELECT {} FROM submissions WHERE id = $1", SUBMISSION_COLUMNS);
        let submission = sqlx::query_as::<Postgres, Submission>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "select"))]
    async fn list_by_owner(&self, owner: &str, limit: i64) -> Result<Vec<Submission>, AppError> {
        let query = format!(
            "SELECT {} FROM submissions WHERE owner = $1 ORDER BY created_at DESC LIMIT $2",
            SUBMISSION_COLUMNS
        );
        let submissions = sqlx::query_as::<Postgres, Submission>(&query)
            .bind(owner)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(submissions)
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "select"))]
    async fn list_public(
        &self,
        name_filter: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Submission>, AppError> {
        let submissions = match name_filter.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let query = format!(
                    "SELECT {} FROM submissions WHERE is_public AND file_name ILIKE $1 \
                     ORDER BY created_at DESC LIMIT $2",
                    SUBMISSION_COLUMNS
                );
                sqlx::query_as::<Postgres, Submission>(&query)
                    .bind(format!("%{}%", super::escape_like(q)))
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {} FROM submissions WHERE is_public ORDER BY created_at DESC LIMIT $1",
                    SUBMISSION_COLUMNS
                );
                sqlx::query_as::<Postgres, Submission>(&query)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(submissions)
    }

    #[tracing::instrument(skip(self, report), fields(db.table = "submissions", db.operation = "update", db.record_id = %id))]
    async fn record_analysis(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        score: i32,
        report: serde_json::Value,
    ) -> Result<Option<Submission>, AppError> {
        let query = format!(
            r#"
            UPDATE submissions
            SET status = $2, score = $3, report = $4, analyzed_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );

        let submission = sqlx::query_as::<Postgres, Submission>(&query)
            .bind(id)
            .bind(status.to_string())
            .bind(score)
            .bind(report)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "update", db.record_id = %id))]
    async fn set_visibility(
        &self,
        id: Uuid,
        owner: &str,
        is_public: bool,
    ) -> Result<Option<Submission>, AppError> {
        let query = format!(
            "UPDATE submissions SET is_public = $3 WHERE id = $1 AND owner = $2 RETURNING {}",
            SUBMISSION_COLUMNS
        );

        let submission = sqlx::query_as::<Postgres, Submission>(&query)
            .bind(id)
            .bind(owner)
            .bind(is_public)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid, owner: &str) -> Result<Option<Submission>, AppError> {
        let query = format!(
            "DELETE FROM submissions WHERE id = $1 AND owner = $2 RETURNING {}",
            SUBMISSION_COLUMNS
        );

        let submission = sqlx::query_as::<Postgres, Submission>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
