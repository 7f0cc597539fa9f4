use std::fmt;

use http::StatusCode;

/// Prefix of the message raised when required request headers are absent.
pub const MISSING_HEADERS_PREFIX: &str = "Missing required headers";

/// Text that marks an untyped error as an infrastructure (storage) failure.
pub const DATABASE_FAILURE_MARKER: &str = "database operation failed";

/// Application error carrying an explicit HTTP status and a client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// `Missing required headers: A, C`, names kept in the given order.
    #[must_use]
    pub fn missing_headers<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = names
            .into_iter()
            .map(|n| n.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(", ");
        Self::bad_request(format!("{MISSING_HEADERS_PREFIX}: {joined}"))
    }

    /// `Invalid headers: <header> (<reason>)`
    #[must_use]
    pub fn invalid_header(header: &str, reason: &str) -> Self {
        Self::bad_request(format!("Invalid headers: {header} ({reason})"))
    }

    /// Header names listed by a [`AppError::missing_headers`] message.
    #[must_use]
    pub fn missing_header_names(&self) -> Option<Vec<String>> {
        if !self.message.contains(MISSING_HEADERS_PREFIX) {
            return None;
        }
        let list = self
            .message
            .strip_prefix(MISSING_HEADERS_PREFIX)
            .and_then(|rest| rest.strip_prefix(": "))
            .unwrap_or(&self.message);
        Some(list.split(", ").map(str::to_owned).collect())
    }
}

/// An error recorded while a request was being handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedError {
    Typed(AppError),
    /// Any other failure, kept as its display text.
    Untyped(String),
}

impl RecordedError {
    #[must_use]
    pub fn untyped(err: impl fmt::Display) -> Self {
        Self::Untyped(err.to_string())
    }

    /// True for untyped errors raised by the storage layer.
    #[must_use]
    pub fn is_infrastructure_failure(&self) -> bool {
        matches!(self, Self::Untyped(text) if text.contains(DATABASE_FAILURE_MARKER))
    }
}

impl fmt::Display for RecordedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(err) => write!(f, "{} {}", err.status.as_u16(), err.message),
            Self::Untyped(text) => f.write_str(text),
        }
    }
}

impl From<AppError> for RecordedError {
    fn from(value: AppError) -> Self {
        Self::Typed(value)
    }
}
