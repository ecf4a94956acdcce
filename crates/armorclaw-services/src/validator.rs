//! File Validator: size ceiling per identity class, then declared type OR extension.
//!
//! This is a permissive allow-list check, not content sniffing. A file renamed to a
//! permitted extension passes.

use armorclaw_core::{models::IdentityClass, AppError, IntakePolicy};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File is empty")]
    Empty,

    #[error("File size {size} bytes exceeds the {limit} byte limit for {class} uploads")]
    TooLarge {
        class: IdentityClass,
        size: u64,
        limit: u64,
    },

    #[error("File type '{content_type}' with name '{file_name}' is not allowed")]
    UnsupportedType {
        content_type: String,
        file_name: String,
    },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Empty => AppError::BadRequest(err.to_string()),
            ValidationError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::UnsupportedType { .. } => {
                AppError::UnsupportedFileType(err.to_string())
            }
        }
    }
}

/// Lowercase MIME type without parameters (`Text/Plain; charset=utf-8` -> `text/plain`).
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Lowercase extension after the last dot, if the name has one.
pub fn file_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    base.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[derive(Debug, Clone)]
pub struct FileValidator {
    policy: IntakePolicy,
}

impl FileValidator {
    pub fn new(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// Accept or reject a file. Pure function of its inputs and the policy.
    pub fn validate(
        &self,
        class: IdentityClass,
        size: u64,
        content_type: &str,
        file_name: &str,
    ) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::Empty);
        }

        let limit = self.policy.ceiling(class).max_file_size_bytes;
        if size > limit {
            return Err(ValidationError::TooLarge { class, size, limit });
        }

        if self.type_allowed(content_type) || self.extension_allowed(file_name) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedType {
                content_type: content_type.to_string(),
                file_name: file_name.to_string(),
            })
        }
    }

    fn type_allowed(&self, content_type: &str) -> bool {
        let mime = normalize_mime_type(content_type);
        !mime.is_empty() && self.policy.allowed_content_types.iter().any(|t| *t == mime)
    }

    fn extension_allowed(&self, file_name: &str) -> bool {
        match file_extension(file_name) {
            Some(ext) => self.policy.allowed_extensions.iter().any(|e| *e == ext),
            None => false,
        }
    }
}
