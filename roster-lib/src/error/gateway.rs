//! Gateway error types

use std::time::Duration;

use crate::model::RecordId;

/// Errors that can occur while talking to a record collection.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP error response from the backend.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Call timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to decode a response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// The backend answered with `success: false`.
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    /// No record with this id exists in the collection.
    #[error("Record {0} not found")]
    NotFound(RecordId),

    /// The collection could not serve the call.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns `true` if a fresh user-initiated attempt could succeed.
    ///
    /// Nothing in the library retries on its own; this only informs the
    /// message shown to the user.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Network(_) => true,
            Self::Timeout(_) => true,
            Self::Unavailable(_) => true,
            _ => false,
        }
    }
}
