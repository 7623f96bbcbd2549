//! Error types for the messaging client.

use thiserror::Error;

/// Errors that can occur while driving the messaging session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The phone number cannot be turned into a chat id.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The media URL is malformed or uses an unsupported scheme.
    #[error("invalid media URL: {0}")]
    InvalidMediaUrl(String),

    /// Downloading media failed.
    #[error("media fetch failed: {0}")]
    MediaFetch(String),

    /// The messaging engine rejected or failed an operation.
    #[error("engine error: {0}")]
    Engine(String),

    /// An operation did not finish in time.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// What was being waited on.
        operation: &'static str,
        /// Configured limit.
        seconds: u64,
    },

    /// QR payload could not be rendered.
    #[error("QR render error: {0}")]
    QrRender(String),

    /// Session store error.
    #[error("store error: {0}")]
    Store(#[from] relay_store::StoreError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = ClientError::Timeout {
            operation: "send",
            seconds: 60,
        };
        assert_eq!(err.to_string(), "send timed out after 60s");
    }

    #[test]
    fn test_store_error_conversion() {
        let err: ClientError = relay_store::StoreError::Database("boom".into()).into();
        assert!(matches!(err, ClientError::Store(_)));
        assert_eq!(err.to_string(), "store error: database error: boom");
    }
}
