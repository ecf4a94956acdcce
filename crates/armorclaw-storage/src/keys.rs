//! Shared key generation for storage backends.
//!
//! Key format: `submissions/{owner}/{timestamp_ms}-{uuid}.{ext}`. The owner segment is the
//! sanitized owner key (account id or `ip:{address}`), the extension comes from the original
//! filename and defaults to `bin`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const KEY_PREFIX: &str = "submissions";
const DEFAULT_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 10;

/// Generate a globally unique storage key for an owner's upload.
pub fn generate_storage_key(owner: &str, filename: &str) -> String {
    build_storage_key(owner, filename, Utc::now(), Uuid::new_v4())
}

pub(crate) fn build_storage_key(
    owner: &str,
    filename: &str,
    now: DateTime<Utc>,
    id: Uuid,
) -> String {
    format!(
        "{}/{}/{}-{}.{}",
        KEY_PREFIX,
        sanitize_segment(owner),
        now.timestamp_millis(),
        id,
        extension_of(filename)
    )
}

/// Restrict a path segment to `[A-Za-z0-9._-]` and break up `..` runs.
fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.replace("..", "__");
    if cleaned.is_empty() || cleaned == "." {
        "unknown".to_string()
    } else {
        cleaned
    }
}

fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_key_layout() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = Uuid::nil();
        let key = build_storage_key("user-42", "Probe.C", now, id);
        assert_eq!(
            key,
            format!("submissions/user-42/1700000000123-{}.c", Uuid::nil())
        );
    }

    #[test]
    fn test_anonymous_owner_is_sanitized() {
        let key = generate_storage_key("ip:2001:db8::1", "x.zip");
        assert!(key.starts_with("submissions/ip_2001_db8__1/"));
        assert!(key.ends_with(".zip"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn test_traversal_owner_cannot_escape() {
        let key = generate_storage_key("../../etc", "passwd");
        assert!(!key.contains(".."));
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn test_keys_are_unique() {
        let a = generate_storage_key("owner", "a.c");
        let b = generate_storage_key("owner", "a.c");
        assert_ne!(a, b);
    }

    #[test]
    fn test_unusual_extensions_fall_back() {
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("noext"), "bin");
        assert_eq!(extension_of("weird.ex/t"), "bin");
        assert_eq!(extension_of("trailing."), "bin");
    }
}
