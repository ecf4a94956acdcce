//! Locally generated stand-in report, used when the AI collaborator is unavailable.

use armorclaw_core::models::{
    AuditReport, CheckStatus, ReportMetadata, ReportStatus, ReportSummary, SecurityCheck, Severity,
};
use chrono::Utc;
use rand::Rng;

pub const PLACEHOLDER_ANALYZER_VERSION: &str = "1.0.0-placeholder";
const TOTAL_CHECKS: u32 = 15;

fn check(
    category: &str,
    ok: bool,
    failing_status: CheckStatus,
    passed_details: &str,
    failing_details: &str,
) -> SecurityCheck {
    let (status, severity, details) = if ok {
        (CheckStatus::Passed, Severity::Info, passed_details)
    } else {
        let severity = match failing_status {
            CheckStatus::Critical => Severity::Critical,
            _ => Severity::Warning,
        };
        (failing_status, severity, failing_details)
    };
    SecurityCheck {
        category: category.to_string(),
        status,
        details: details.to_string(),
        severity,
    }
}

fn always_passed(category: &str, details: &str) -> SecurityCheck {
    check(category, true, CheckStatus::Passed, details, details)
}

/// Placeholder report with a random score in 70..=99.
pub fn placeholder_report<R: Rng + ?Sized>(file_name: &str, rng: &mut R) -> AuditReport {
    let score: u32 = rng.random_range(70..=99);
    let warnings = if score < 90 { rng.random_range(1..=3) } else { 0 };
    let critical = if score < 80 { rng.random_range(0..=1) } else { 0 };
    placeholder_report_with(file_name, score, warnings, critical)
}

pub(crate) fn placeholder_report_with(
    file_name: &str,
    score: u32,
    warnings: u32,
    critical: u32,
) -> AuditReport {
    let checks = vec![
        always_passed(
            "Memory safety",
            "No buffer overflow or memory leak risk detected",
        ),
        check(
            "Race conditions",
            score >= 85,
            CheckStatus::Warning,
            "No obvious race conditions detected",
            "Potential race condition detected; consider adding appropriate locking",
        ),
        always_passed(
            "Permissions",
            "Program permissions follow the principle of least privilege",
        ),
        check(
            "Resource limits",
            score >= 90,
            CheckStatus::Warning,
            "Resource usage is within reasonable bounds",
            "Consider enforcing stricter resource limits",
        ),
        check(
            "Input validation",
            score >= 80,
            CheckStatus::Critical,
            "Input validation is thorough",
            "Insufficient input validation detected; this is a security risk",
        ),
        always_passed(
            "Map operations",
            "BPF map operations follow safe usage patterns",
        ),
        always_passed(
            "Helper functions",
            "Helper calls are correct; no unsafe usage detected",
        ),
        check(
            "Instruction complexity",
            score >= 75,
            CheckStatus::Warning,
            "Instruction count is within reasonable bounds",
            "High instruction count may affect verifier limits and performance",
        ),
    ];

    AuditReport {
        score,
        status: ReportStatus::from_score(score),
        summary: ReportSummary {
            total_checks: TOTAL_CHECKS,
            passed: score * TOTAL_CHECKS / 100,
            warnings,
            critical,
        },
        checks,
        recommendations: vec![
            "Run thorough load testing before deploying to production".to_string(),
            "Consider adding more detailed logging to aid debugging".to_string(),
            if score < 90 {
                "Fix all warning-level findings to improve security".to_string()
            } else {
                "Code quality is good and ready to deploy".to_string()
            },
        ],
        metadata: Some(ReportMetadata {
            analyzed_at: Utc::now(),
            analyzer_version: PLACEHOLDER_ANALYZER_VERSION.to_string(),
            file_name: file_name.to_string(),
        }),
    }
}

/// Prefix the recommendations with a marker saying a placeholder was used.
pub(crate) fn disclose(mut report: AuditReport, reason: Option<&str>) -> AuditReport {
    let marker = match reason {
        Some(reason) => format!("⚠️ AI analysis failed, using placeholder: {}", reason),
        None => "⚠️ AI analysis not configured, using placeholder".to_string(),
    };
    report.recommendations.insert(0, marker);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use validator::Validate;

    #[test]
    fn test_random_reports_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let report = placeholder_report("tracer.c", &mut rng);
            assert!((70..=99).contains(&report.score));
            assert!(report.validate().is_ok());
            assert_eq!(report.checks.len(), 8);
            assert_eq!(report.recommendations.len(), 3);
            if report.score >= 90 {
                assert_eq!(report.summary.warnings, 0);
            } else {
                assert!((1..=3).contains(&report.summary.warnings));
            }
            if report.score >= 80 {
                assert_eq!(report.summary.critical, 0);
            }
        }
    }

    #[test]
    fn test_low_score_flags_checks() {
        let report = placeholder_report_with("tracer.c", 72, 2, 1);
        assert_eq!(report.status, ReportStatus::Warning);
        assert_eq!(report.summary.passed, 10);
        let input = report
            .checks
            .iter()
            .find(|c| c.category == "Input validation")
            .unwrap();
        assert_eq!(input.status, CheckStatus::Critical);
        assert_eq!(input.severity, Severity::Critical);
        let complexity = report
            .checks
            .iter()
            .find(|c| c.category == "Instruction complexity")
            .unwrap();
        assert_eq!(complexity.status, CheckStatus::Warning);
    }

    #[test]
    fn test_high_score_passes_everything() {
        let report = placeholder_report_with("tracer.c", 95, 0, 0);
        assert_eq!(report.status, ReportStatus::Passed);
        assert!(report.checks.iter().all(|c| c.status == CheckStatus::Passed));
        assert_eq!(
            report.metadata.unwrap().analyzer_version,
            PLACEHOLDER_ANALYZER_VERSION
        );
    }

    #[test]
    fn test_disclosure_is_first_recommendation() {
        let report = disclose(placeholder_report_with("x", 80, 1, 0), Some("timeout"));
        assert_eq!(
            report.recommendations[0],
            "⚠️ AI analysis failed, using placeholder: timeout"
        );
        let report = disclose(placeholder_report_with("x", 80, 1, 0), None);
        assert!(report.recommendations[0].starts_with("⚠️ AI analysis not configured"));
    }
}
