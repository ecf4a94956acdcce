//! ArmorClaw Services Layer
//!
//! Hosts the upload intake pipeline (quota ledger, file validator, submission recorder),
//! the archive flattener, analysis orchestration over the AI collaborator and the chat
//! assistant. Re-exports storage so the API crate depends on a single service facade.
//! Keep business logic here; keep thin HTTP handling in armorclaw-api.

pub mod ai;
pub mod analysis;
pub mod archive;
pub mod chat;
pub mod export;
pub mod intake;
pub mod quota;
pub mod recorder;
pub mod validator;

pub use ai::{AiClient, CompletionMessage, CompletionOptions};
pub use analysis::{
    AnalysisOutcome, AnalysisRun, AnalysisService, AnalysisView, SecurityAuditor,
};
pub use archive::{flatten, ProjectInput};
pub use armorclaw_storage::{
    create_storage, LocalStorage, S3Storage, Storage, StorageBackend, StorageError, StorageResult,
};
pub use chat::{ChatReply, ChatService};
pub use export::{export_filename, ExportFormat};
pub use intake::{UploadCandidate, UploadIntake};
pub use quota::{QuotaLedger, QuotaStatus};
pub use recorder::{RecordedSubmission, SubmissionRecorder};
pub use validator::{normalize_mime_type, FileValidator, ValidationError};
