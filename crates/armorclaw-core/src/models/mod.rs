pub mod chat;
pub mod identity;
pub mod project_file;
pub mod report;
pub mod submission;

pub use chat::{chat_title_from_message, Chat, ChatMessage, ChatRole, ConversationTurn};
pub use identity::{Identity, IdentityClass, ANONYMOUS_OWNER_PREFIX};
pub use project_file::ProjectFile;
pub use report::{
    AuditReport, CheckStatus, ReportMetadata, ReportStatus, ReportSummary, SecurityCheck, Severity,
};
pub use submission::{NewSubmission, Submission, SubmissionStatus, SubmissionSummary, UploadedFile};
