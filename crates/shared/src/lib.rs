//! Shared library for the manga library tracker.
//!
//! This crate provides common functionality used by the server and the
//! catalog client:
//! - Configuration management
//! - Database connection and schema
//! - Library store (persisted manga records)
//! - Logging infrastructure
//! - Shared error types

pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use library::{LibraryStore, Upserted};
pub use logging::LogConfig;
pub use models::*;
