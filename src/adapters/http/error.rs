//! Error types for the HTTP backend adapter.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend rejected the call: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("successful response carried no payload")]
    MissingData,

    #[error("token provider failed: {0}")]
    Token(String),
}

impl BackendError {
    /// Attaches the HTTP status to a malformed-body error, which is
    /// usually a proxy page rather than the backend's envelope.
    pub(crate) fn with_status(self, status: StatusCode) -> Self {
        match self {
            BackendError::Malformed(msg) => {
                BackendError::Malformed(format!("{msg} (http status {status})"))
            }
            other => other,
        }
    }
}
