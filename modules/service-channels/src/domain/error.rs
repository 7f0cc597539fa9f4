//! Domain errors for service channels.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// The requested record does not exist. Carries the client-facing message.
    #[error("{0}")]
    NotFound(&'static str),

    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Conflict(String),

    /// Repository failure.
    #[error("database operation failed: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
