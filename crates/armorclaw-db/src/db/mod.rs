//! Database repositories for data access layer
//!
//! `submission` holds uploaded artifacts and their audit lifecycle, `chat` the assistant
//! conversations. Each exposes an async store trait so services can run against Postgres
//! or the in-memory stores used in tests.

pub mod chat;
pub mod submission;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use chat::{ChatRepository, ChatStore};
pub use submission::{SubmissionRepository, SubmissionStore};

#[cfg(any(test, feature = "test-utils"))]
pub use memory::{InMemoryChatStore, InMemorySubmissionStore};

/// Escape `%`, `_` and `\` so user text matches literally inside an ILIKE pattern.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
