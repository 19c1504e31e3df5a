//! Error types for library persistence.

use thiserror::Error;

/// Errors raised by the library store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record violates persisted-record constraints (one message per field)
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// No record has the given identity
    #[error("Manga not found: {0}")]
    NotFound(i64),

    /// Another writer inserted the same external id first; re-read and retry
    #[error("Manga with external id {0} already exists")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to encode genres: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
