//! Audit history export as CSV or JSON.

use std::fmt::{Display, Formatter, Result as FmtResult};

use armorclaw_core::{models::Submission, AppError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const CSV_HEADER: [&str; 7] = [
    "Audit ID",
    "Skill Name",
    "File Hash",
    "Status",
    "Security Score",
    "Is Public",
    "Timestamp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    /// `json` selects JSON; anything else, including no value, is CSV.
    pub fn from_query(format: Option<&str>) -> Self {
        match format {
            Some(f) if f.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

/// One audit in the JSON export, with its stored report.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    pub id: Uuid,
    pub skill_name: String,
    pub skill_hash: String,
    pub status: String,
    pub score: Option<i32>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub report: Option<serde_json::Value>,
}

impl From<&Submission> for ExportRecord {
    fn from(s: &Submission) -> Self {
        ExportRecord {
            id: s.id,
            skill_name: s.file_name.clone(),
            skill_hash: s.sha256.clone(),
            status: s.status.to_string(),
            score: s.score,
            is_public: s.is_public,
            created_at: s.created_at,
            report: s.report.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonExport {
    exported_at: DateTime<Utc>,
    total: usize,
    audits: Vec<ExportRecord>,
}

/// `armorclaw-audits-YYYY-MM-DD.{csv,json}`
pub fn export_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!("armorclaw-audits-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Quote a field when it contains a comma, a double quote or a line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header row then one row per submission, joined by `\n`. Missing scores are empty.
pub fn to_csv(submissions: &[Submission]) -> String {
    let mut rows = vec![CSV_HEADER.join(",")];
    for s in submissions {
        let fields = [
            s.id.to_string(),
            s.file_name.clone(),
            s.sha256.clone(),
            s.status.to_string(),
            s.score.map(|score| score.to_string()).unwrap_or_default(),
            if s.is_public { "Yes" } else { "No" }.to_string(),
            s.created_at.to_rfc3339(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        rows.push(row.join(","));
    }
    rows.join("\n")
}

pub fn to_json(submissions: &[Submission]) -> Result<String, AppError> {
    let export = JsonExport {
        exported_at: Utc::now(),
        total: submissions.len(),
        audits: submissions.iter().map(ExportRecord::from).collect(),
    };
    serde_json::to_string_pretty(&export).map_err(|e| AppError::InternalWithSource {
        message: "Failed to serialize audit export".to_string(),
        source: e.into(),
    })
}

/// Render the export body for `format`.
pub fn render(format: ExportFormat, submissions: &[Submission]) -> Result<String, AppError> {
    match format {
        ExportFormat::Csv => Ok(to_csv(submissions)),
        ExportFormat::Json => to_json(submissions),
    }
}
