use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of a submission: `pending` until analysis runs, then the report's verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Passed,
    Warning,
    Failed,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

impl Display for SubmissionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Passed => write!(f, "passed"),
            SubmissionStatus::Warning => write!(f, "warning"),
            SubmissionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "passed" => Ok(SubmissionStatus::Passed),
            "warning" => Ok(SubmissionStatus::Warning),
            "failed" => Ok(SubmissionStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid submission status: {}", s)),
        }
    }
}

/// Persisted metadata record of one uploaded artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    /// Owner key: account id or `ip:{address}`.
    pub owner: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Content-store key; unique and never rewritten.
    pub storage_key: String,
    pub sha256: String,
    pub status: SubmissionStatus,
    pub score: Option<i32>,
    pub is_public: bool,
    pub report: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

#[cfg(feature = "sqlx")]
impl sqlx::FromRow<'_, sqlx::postgres::PgRow> for Submission {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Submission {
            id: row.try_get("id")?,
            owner: row.try_get("owner")?,
            file_name: row.try_get("file_name")?,
            content_type: row.try_get("content_type")?,
            size_bytes: row.try_get("size_bytes")?,
            storage_key: row.try_get("storage_key")?,
            sha256: row.try_get("sha256")?,
            status: row.try_get::<String, _>("status")?.parse().map_err(|e| {
                sqlx::Error::Decode(format!("Failed to parse status: {}", e).into())
            })?,
            score: row.try_get("score")?,
            is_public: row.try_get("is_public")?,
            report: row.try_get("report")?,
            created_at: row.try_get("created_at")?,
            analyzed_at: row.try_get("analyzed_at")?,
        })
    }
}

/// Fields needed to append a new submission row.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub id: Uuid,
    pub owner: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub sha256: String,
}

/// Submission as listed to its owner or on the market.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionSummary {
    pub id: Uuid,
    pub skill_name: String,
    pub status: SubmissionStatus,
    pub score: Option<i32>,
    pub is_public: bool,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionSummary {
    fn from(s: Submission) -> Self {
        SubmissionSummary {
            id: s.id,
            skill_name: s.file_name,
            status: s.status,
            score: s.score,
            is_public: s.is_public,
            size_bytes: s.size_bytes,
            created_at: s.created_at,
        }
    }
}

/// Upload acknowledgement payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadedFile {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub key: String,
    pub uploaded_at: DateTime<Utc>,
}
