use armorclaw_core::models::AuditReport;
use validator::Validate;

pub const AI_ANALYZER_VERSION: &str = "2.0.0-ai-architect";

/// Result of asking the AI collaborator for a report.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Ok(AuditReport),
    /// The model answered but the text is not a valid report. Holds the raw text.
    ParseError(String),
    /// The request failed or the provider returned an error.
    UpstreamError(String),
    /// The stored artifact could not be read, so nothing was sent.
    InputUnavailable(String),
}

impl AnalysisOutcome {
    /// Short reason used in the placeholder disclosure.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            AnalysisOutcome::Ok(_) => None,
            AnalysisOutcome::ParseError(_) => {
                Some("AI response was not a valid report".to_string())
            }
            AnalysisOutcome::UpstreamError(cause) | AnalysisOutcome::InputUnavailable(cause) => {
                Some(cause.clone())
            }
        }
    }
}

/// Remove a surrounding ```json / ``` fence.
fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parse model output into a report. Extra fields are ignored, missing required fields or
/// an out-of-range score yield `ParseError`, missing metadata is filled in.
pub fn parse_report(raw: &str, file_name: &str) -> AnalysisOutcome {
    let report: AuditReport = match serde_json::from_str(strip_code_fence(raw)) {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(error = %e, "AI response is not a valid report");
            return AnalysisOutcome::ParseError(raw.to_string());
        }
    };

    if let Err(e) = report.validate() {
        tracing::warn!(error = %e, "AI report failed validation");
        return AnalysisOutcome::ParseError(raw.to_string());
    }

    AnalysisOutcome::Ok(report.with_default_metadata(AI_ANALYZER_VERSION, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use armorclaw_core::models::ReportStatus;

    const REPORT: &str = r#"{
        "score": 91,
        "status": "passed",
        "summary": {"total_checks": 6, "passed": 6, "warnings": 0, "critical": 0},
        "checks": [{"category": "Memory safety", "status": "passed", "details": "Bounds checked", "severity": "info"}],
        "recommendations": ["Pin map sizes"],
        "confidence": 0.8
    }"#;

    #[test]
    fn test_fenced_report_parses_and_gets_metadata() {
        let fenced = format!("```json\n{}\n```", REPORT);
        match parse_report(&fenced, "tracer.zip") {
            AnalysisOutcome::Ok(report) => {
                assert_eq!(report.score, 91);
                assert_eq!(report.status, ReportStatus::Passed);
                let metadata = report.metadata.unwrap();
                assert_eq!(metadata.analyzer_version, AI_ANALYZER_VERSION);
                assert_eq!(metadata.file_name, "tracer.zip");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_bare_fence_is_stripped() {
        let fenced = format!("```\n{}```", REPORT);
        assert!(matches!(parse_report(&fenced, "x"), AnalysisOutcome::Ok(_)));
    }

    #[test]
    fn test_supplied_metadata_is_kept() {
        let raw = REPORT.replacen(
            "\"confidence\": 0.8",
            r#""metadata": {"analyzed_at": "2026-01-02T03:04:05Z", "analyzer_version": "model-x", "file_name": "orig.c"}"#,
            1,
        );
        let AnalysisOutcome::Ok(report) = parse_report(&raw, "tracer.zip") else {
            panic!("expected report");
        };
        assert_eq!(report.metadata.unwrap().analyzer_version, "model-x");
    }

    #[test]
    fn test_date_only_metadata_timestamp_is_accepted() {
        let raw = REPORT.replacen(
            "\"confidence\": 0.8",
            r#""metadata": {"analyzed_at": "2026-10-18", "analyzer_version": "model-x", "file_name": "orig.c"}"#,
            1,
        );
        let AnalysisOutcome::Ok(report) = parse_report(&raw, "p.c") else {
            panic!("expected report");
        };
        let metadata = report.metadata.unwrap();
        assert_eq!(metadata.analyzer_version, "model-x");
        assert_eq!(metadata.analyzed_at.date_naive().to_string(), "2026-10-18");
    }

    #[test]
    fn test_unfit_metadata_is_replaced_with_defaults() {
        let raw = REPORT.replacen(
            "\"confidence\": 0.8",
            r#""metadata": {"analyzed_at": 12, "note": "partial"}"#,
            1,
        );
        let AnalysisOutcome::Ok(report) = parse_report(&raw, "p.c") else {
            panic!("expected report");
        };
        let metadata = report.metadata.unwrap();
        assert_eq!(metadata.analyzer_version, AI_ANALYZER_VERSION);
        assert_eq!(metadata.file_name, "p.c");
    }

    #[test]
    fn test_float_score_is_accepted() {
        let raw = REPORT.replacen("\"score\": 91", "\"score\": 85.0", 1);
        let AnalysisOutcome::Ok(report) = parse_report(&raw, "p.c") else {
            panic!("expected report");
        };
        assert_eq!(report.score, 85);

        let raw = REPORT.replacen("\"score\": 91", "\"score\": 84.6", 1);
        let AnalysisOutcome::Ok(report) = parse_report(&raw, "p.c") else {
            panic!("expected report");
        };
        assert_eq!(report.score, 85);
    }

    #[test]
    fn test_negative_or_textual_score_is_parse_error() {
        let negative = REPORT.replacen("\"score\": 91", "\"score\": -3", 1);
        assert!(matches!(
            parse_report(&negative, "x"),
            AnalysisOutcome::ParseError(_)
        ));

        let textual = REPORT.replacen("\"score\": 91", "\"score\": \"high\"", 1);
        assert!(matches!(
            parse_report(&textual, "x"),
            AnalysisOutcome::ParseError(_)
        ));
    }

    #[test]
    fn test_prose_is_parse_error_with_raw_text() {
        let raw = "I could not analyze this project.";
        assert_eq!(
            parse_report(raw, "x"),
            AnalysisOutcome::ParseError(raw.to_string())
        );
    }

    #[test]
    fn test_missing_field_and_bad_score_are_parse_errors() {
        let missing = r#"{"score": 50, "status": "failed", "checks": [], "recommendations": []}"#;
        assert!(matches!(
            parse_report(missing, "x"),
            AnalysisOutcome::ParseError(_)
        ));

        let out_of_range = REPORT.replacen("91", "140", 1);
        assert!(matches!(
            parse_report(&out_of_range, "x"),
            AnalysisOutcome::ParseError(_)
        ));
    }
}
