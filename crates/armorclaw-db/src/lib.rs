//! ArmorClaw database layer
//!
//! Store traits consumed by the services, their Postgres implementations, and in-memory
//! stores for tests (behind the `test-utils` feature).

pub mod db;

pub use db::*;
