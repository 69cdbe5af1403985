use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    config::LoadError, domain::error::ValidationError, infra::error::InfraError,
    infra::http::ClientError,
};

/// Error chain flattened for display, outermost first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    /// `outer: inner: innermost`, skipping repeats from transparent wrappers.
    pub fn render(&self) -> String {
        let mut rendered: Vec<&str> = Vec::with_capacity(self.messages.len());
        for message in &self.messages {
            if rendered.last().is_none_or(|last| !last.contains(message.as_str())) {
                rendered.push(message);
            }
        }
        rendered.join(": ")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error("not logged in")]
    NotAuthenticated,
    #[error("cancelled")]
    Cancelled,
    #[error("resource not found")]
    NotFound,
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Text for an alert: the server's message when it sent one, otherwise
    /// the error's own description.
    pub fn user_message(&self) -> String {
        let text = match self {
            AppError::Client(err) => err.user_message(),
            other => other.to_string(),
        };
        if text.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            text
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}
