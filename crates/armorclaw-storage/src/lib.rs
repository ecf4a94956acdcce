//! ArmorClaw Storage Library
//!
//! Content store for uploaded artifacts: the `Storage` trait plus local filesystem and
//! S3 backends.
//!
//! # Storage key format
//!
//! `submissions/{owner}/{timestamp_ms}-{uuid}.{ext}`, generated by [`generate_storage_key`].
//! Keys never contain `..` or a leading `/`, and an object is never rewritten once stored.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use armorclaw_core::StorageBackend;
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
