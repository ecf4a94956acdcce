//! ArmorClaw Core Library
//!
//! Domain models, error types, configuration and the intake policy shared by every
//! ArmorClaw crate.

pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AiConfig, AppConfig, BaseConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use policy::{IntakePolicy, QuotaCeiling};
pub use storage_types::StorageBackend;
