//! Error types for a3s-redact

use thiserror::Error;

use crate::types::ProcessingStatus;

/// Errors that can occur in the redaction pipeline
#[derive(Debug, Error)]
pub enum RedactError {
    /// Session record or stored object missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upload or download failure against the object store
    #[error("Storage error: {0}")]
    Storage(String),

    /// AEAD tag verification failed (wrong key, tampered or truncated blob)
    #[error("Integrity check failed: invalid key or corrupted data")]
    Integrity,

    /// Missing or malformed request input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Session status change not permitted by the lifecycle
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ProcessingStatus,
        to: ProcessingStatus,
    },

    /// Two detected spans intersect and the overlap policy rejects them
    #[error("Overlapping matches at byte ranges {}..{} and {}..{}", first.0, first.1, second.0, second.1)]
    OverlappingMatches {
        first: (usize, usize),
        second: (usize, usize),
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

/// Result type alias for redaction operations
pub type Result<T> = std::result::Result<T, RedactError>;

impl From<RedactError> for axum::response::Response {
    fn from(err: RedactError) -> Self {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let status = match &err {
            RedactError::NotFound(_) => StatusCode::NOT_FOUND,
            RedactError::Validation(_)
            | RedactError::Integrity
            | RedactError::OverlappingMatches { .. } => StatusCode::BAD_REQUEST,
            RedactError::InvalidTransition { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "error": err.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl axum::response::IntoResponse for RedactError {
    fn into_response(self) -> axum::response::Response {
        self.into()
    }
}
