//! Handler error type and per-request error recording.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;

use channels_errors::{AppError, RecordedError};

/// Errors recorded for the current request.
///
/// The response wrapper installs one per request as a request extension;
/// handlers pick it up with `Extension<ErrorSink>` to record errors without
/// failing the request.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink(Arc<Mutex<Vec<RecordedError>>>);

impl ErrorSink {
    pub fn record(&self, err: impl Into<RecordedError>) {
        self.0.lock().push(err.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Drain everything recorded so far, oldest first.
    #[must_use]
    pub fn take(&self) -> Vec<RecordedError> {
        std::mem::take(&mut *self.0.lock())
    }
}

/// Errors carried from a handler to the wrapper in the response extensions.
#[derive(Debug, Clone, Default)]
pub struct RecordedErrors(pub Vec<RecordedError>);

/// Error returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client-facing error with its own status.
    #[error(transparent)]
    Typed(#[from] AppError),
    /// Anything else; reported as 500 with the full error chain as text.
    #[error(transparent)]
    Untyped(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn untyped(message: impl std::fmt::Display) -> Self {
        Self::Untyped(anyhow::anyhow!("{message}"))
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Typed(err) => err.status,
            Self::Untyped(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_recorded(self) -> RecordedError {
        match self {
            Self::Typed(err) => RecordedError::Typed(err),
            Self::Untyped(err) => RecordedError::Untyped(format!("{err:#}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let mut resp = status.into_response();
        resp.extensions_mut()
            .insert(RecordedErrors(vec![self.into_recorded()]));
        resp
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn sink_keeps_recording_order() {
        let sink = ErrorSink::default();
        assert!(sink.is_empty());
        sink.record(AppError::bad_request("first"));
        sink.clone().record(RecordedError::untyped("second"));
        assert_eq!(sink.len(), 2);

        let drained = sink.take();
        assert_eq!(drained[0], RecordedError::Typed(AppError::bad_request("first")));
        assert_eq!(drained[1], RecordedError::untyped("second"));
        assert!(sink.is_empty());
    }

    #[test]
    fn typed_error_response_carries_its_status() {
        let resp = ApiError::from(AppError::not_found("ATM not found")).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let recorded = resp.extensions().get::<RecordedErrors>().unwrap();
        assert_eq!(
            recorded.0,
            vec![RecordedError::Typed(AppError::not_found("ATM not found"))]
        );
    }

    #[test]
    fn untyped_error_keeps_context_chain() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("connection reset"));
        let err = err.context("database operation failed").unwrap_err();
        let resp = ApiError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let recorded = resp.extensions().get::<RecordedErrors>().unwrap();
        assert_eq!(
            recorded.0,
            vec![RecordedError::untyped("database operation failed: connection reset")]
        );
        assert!(recorded.0[0].is_infrastructure_failure());
    }
}
