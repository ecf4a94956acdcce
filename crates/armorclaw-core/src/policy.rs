//! Intake policy: per-class ceilings and the type/extension allow-lists.
//!
//! Built once from configuration and injected into the validator and the quota ledger,
//! so tests can construct their own without touching the environment.

use crate::models::IdentityClass;

pub const MB: u64 = 1024 * 1024;

pub const DEFAULT_ANONYMOUS_MAX_FILES: i64 = 1;
pub const DEFAULT_ANONYMOUS_MAX_FILE_SIZE_MB: u64 = 2;
pub const DEFAULT_AUTHENTICATED_MAX_FILES: i64 = 10;
pub const DEFAULT_AUTHENTICATED_MAX_FILE_SIZE_MB: u64 = 10;

pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/x-tar",
    "application/gzip",
    "application/x-gzip",
    "text/plain",
    "text/x-c",
    "application/octet-stream",
    "application/x-object",
    "application/x-executable",
    "application/x-sharedlib",
    "application/json",
];

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "c", "h", "cpp", "hpp", "cc", "rs", "go", "py", "js", "ts", "mjs", "sh", "o", "so", "bin", "elf",
    "ebpf", "bpf", "zip", "tar", "gz", "tgz", "json", "yaml", "yml", "toml", "md", "txt",
];

/// Ceiling applied to one identity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCeiling {
    pub max_files: i64,
    pub max_file_size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakePolicy {
    pub anonymous: QuotaCeiling,
    pub authenticated: QuotaCeiling,
    /// Lowercase MIME types without parameters.
    pub allowed_content_types: Vec<String>,
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl IntakePolicy {
    pub fn ceiling(&self, class: IdentityClass) -> QuotaCeiling {
        match class {
            IdentityClass::Anonymous => self.anonymous,
            IdentityClass::Authenticated => self.authenticated,
        }
    }

    /// Largest file any class may upload; used to size the request body limit.
    pub fn largest_file_size_bytes(&self) -> u64 {
        self.anonymous
            .max_file_size_bytes
            .max(self.authenticated.max_file_size_bytes)
    }
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            anonymous: QuotaCeiling {
                max_files: DEFAULT_ANONYMOUS_MAX_FILES,
                max_file_size_bytes: DEFAULT_ANONYMOUS_MAX_FILE_SIZE_MB * MB,
            },
            authenticated: QuotaCeiling {
                max_files: DEFAULT_AUTHENTICATED_MAX_FILES,
                max_file_size_bytes: DEFAULT_AUTHENTICATED_MAX_FILE_SIZE_MB * MB,
            },
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
