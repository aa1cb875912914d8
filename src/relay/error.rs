//! Relay error definitions.

use thiserror::Error;

use crate::relay::types::{ErrorBody, ErrorKind};

/// Errors that can occur while relaying one question.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The backend did not answer within the configured deadline.
    #[error("backend timeout after {0} seconds")]
    Timeout(u64),

    /// Connection or transport failure talking to the backend.
    #[error("backend unavailable: {0}")]
    Unavailable(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The backend answered 2xx but the body is not a valid answer.
    #[error("malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::Timeout(_) => ErrorKind::BackendTimeout,
            RelayError::Unavailable(_) => ErrorKind::BackendUnavailable,
            RelayError::Status { .. } => ErrorKind::BackendStatus,
            RelayError::Decode(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Client-facing description of this failure.
    pub fn to_error_body(&self) -> ErrorBody {
        let status = match self {
            RelayError::Status { status, .. } => Some(*status),
            _ => None,
        };
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
            status,
        }
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors building a [`RelayClient`](crate::relay::RelayClient).
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
