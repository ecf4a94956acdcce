//! Security analysis of stored submissions.
//!
//! The AI collaborator's answer is an external contract, parsed permissively into an
//! [`AnalysisOutcome`]. Anything other than a valid report is replaced by a placeholder so
//! callers always get a report.

pub mod auditor;
pub mod outcome;
pub mod placeholder;
pub mod service;

pub use auditor::SecurityAuditor;
pub use outcome::{parse_report, AnalysisOutcome, AI_ANALYZER_VERSION};
pub use placeholder::{placeholder_report, PLACEHOLDER_ANALYZER_VERSION};
pub use service::{AnalysisRun, AnalysisService, AnalysisView};
