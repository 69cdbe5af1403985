use thiserror::Error;

use crate::domain::error::ValidationError;

/// Failure of a query or mutation against the recipe service.
///
/// `Clone` so a failed query can be stored on its cache entry and handed to
/// every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Transport-level failure; no response was received.
    #[error("network failure: {0}")]
    Network(String),
    /// The service answered with a failure status.
    #[error("server responded with status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api { status: u16, message: Option<String> },
    /// A success response whose body did not match the expected shape.
    #[error("failed to parse response body: {0}")]
    Body(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The cache entry a query was waiting on was dropped by a reset.
    #[error("query was cancelled by a cache reset")]
    Reset,
}

impl ClientError {
    pub fn api(status: u16, message: Option<String>) -> Self {
        Self::Api { status, message }
    }

    /// Text suitable for an alert: the server's message when it sent one,
    /// otherwise the error itself.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
