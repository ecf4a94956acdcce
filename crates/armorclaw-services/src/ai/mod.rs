//! AI collaborator: chat-completions client and the audit prompts.

pub mod client;
pub mod prompt;

pub use client::{AiClient, CompletionMessage, CompletionOptions};
