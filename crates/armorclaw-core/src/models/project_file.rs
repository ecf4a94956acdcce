use serde::Serialize;

/// One file handed to the AI collaborator. Lives only for the duration of an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectFile {
    /// Path relative to the archive root, or the original filename for single uploads.
    pub path: String,
    pub content: String,
    pub size: u64,
}

impl ProjectFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            size,
        }
    }
}
