use thiserror::Error;

/// Failure talking to the external catalog
///
/// Transport errors are flattened to strings so callers never depend on the
/// HTTP client's error type.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("MangaDex {operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: &'static str,
        timeout_secs: u64,
    },

    #[error("MangaDex {operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[error("MangaDex {operation} returned {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("MangaDex {operation} returned an unreadable response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl UpstreamError {
    /// Name of the upstream operation that failed
    pub fn operation(&self) -> &'static str {
        match self {
            UpstreamError::Timeout { operation, .. }
            | UpstreamError::Transport { operation, .. }
            | UpstreamError::Status { operation, .. }
            | UpstreamError::Decode { operation, .. } => operation,
            UpstreamError::Client(_) => "client setup",
        }
    }
}
