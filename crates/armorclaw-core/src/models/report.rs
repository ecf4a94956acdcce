//! Audit report exchanged with the AI collaborator.
//!
//! The shape is an external contract: unknown fields are ignored, required fields must
//! be present, `metadata` may be omitted and is filled in by the caller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::SubmissionStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Passed,
    Warning,
    Failed,
}

impl ReportStatus {
    /// Verdict for a 0-100 score: passed at 90 and above, warning from 70.
    pub fn from_score(score: u32) -> Self {
        if score >= 90 {
            ReportStatus::Passed
        } else if score >= 70 {
            ReportStatus::Warning
        } else {
            ReportStatus::Failed
        }
    }
}

impl From<ReportStatus> for SubmissionStatus {
    fn from(status: ReportStatus) -> Self {
        match status {
            ReportStatus::Passed => SubmissionStatus::Passed,
            ReportStatus::Warning => SubmissionStatus::Warning,
            ReportStatus::Failed => SubmissionStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ReportSummary {
    pub total_checks: u32,
    pub passed: u32,
    pub warnings: u32,
    pub critical: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SecurityCheck {
    pub category: String,
    pub status: CheckStatus,
    pub details: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ReportMetadata {
    pub analyzed_at: DateTime<Utc>,
    pub analyzer_version: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate, ToSchema)]
pub struct AuditReport {
    #[validate(range(max = 100))]
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u32,
    pub status: ReportStatus,
    pub summary: ReportSummary,
    pub checks: Vec<SecurityCheck>,
    pub recommendations: Vec<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_metadata",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<ReportMetadata>,
}

/// Whole or fractional JSON number, rounded. Range is checked by validation.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    let rounded = raw.round();
    if !rounded.is_finite() || rounded < 0.0 || rounded > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "score {} is not a non-negative number",
            raw
        )));
    }
    Ok(rounded as u32)
}

#[derive(Deserialize)]
struct LooseMetadata {
    #[serde(default)]
    analyzed_at: Option<serde_json::Value>,
    analyzer_version: Option<String>,
    file_name: Option<String>,
}

/// RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|t| t.and_utc())
        })
}

/// Metadata that does not fit is dropped rather than failing the report; an unreadable
/// `analyzed_at` becomes now.
fn deserialize_metadata<'de, D>(deserializer: D) -> Result<Option<ReportMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(loose) = value.and_then(|v| serde_json::from_value::<LooseMetadata>(v).ok()) else {
        return Ok(None);
    };
    let (Some(analyzer_version), Some(file_name)) = (loose.analyzer_version, loose.file_name)
    else {
        return Ok(None);
    };
    let analyzed_at = loose
        .analyzed_at
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);
    Ok(Some(ReportMetadata {
        analyzed_at,
        analyzer_version,
        file_name,
    }))
}

impl AuditReport {
    /// Fill in metadata when the producer left it out.
    pub fn with_default_metadata(mut self, analyzer_version: &str, file_name: &str) -> Self {
        if self.metadata.is_none() {
            self.metadata = Some(ReportMetadata {
                analyzed_at: Utc::now(),
                analyzer_version: analyzer_version.to_string(),
                file_name: file_name.to_string(),
            });
        }
        self
    }
}
