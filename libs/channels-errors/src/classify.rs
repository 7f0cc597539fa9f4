use http::StatusCode;
use serde_json::Value;

use crate::app_error::{AppError, MISSING_HEADERS_PREFIX, RecordedError};
use crate::envelope::{ErrorResponse, ResponseEnvelope, SuccessResponse};

/// Source description for non-2xx responses that recorded no error.
pub const UNEXPECTED_ERROR_DESCRIPTION: &str = "An unexpected error occurred";

/// Decide the final status and envelope for a handled request.
///
/// The most recently recorded error decides: a typed error keeps its own
/// status, anything else becomes a 500 (storage failures included). Without
/// errors, a non-2xx status is reported as unexpected and its body dropped,
/// while a 2xx body becomes the `data` payload, decoded as JSON when possible
/// and carried as a string otherwise.
#[must_use]
pub fn classify(
    status: StatusCode,
    errors: &[RecordedError],
    body: &[u8],
) -> (StatusCode, ResponseEnvelope) {
    match errors.last() {
        Some(RecordedError::Typed(err)) => typed(err),
        Some(RecordedError::Untyped(text)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, text.as_str()).into(),
        ),
        None if !status.is_success() => (
            status,
            ErrorResponse::new(status, UNEXPECTED_ERROR_DESCRIPTION).into(),
        ),
        None => (status, SuccessResponse::new(decode_body(body)).into()),
    }
}

fn typed(err: &AppError) -> (StatusCode, ResponseEnvelope) {
    let envelope = match err.missing_header_names() {
        Some(names) => {
            ErrorResponse::new(err.status, MISSING_HEADERS_PREFIX).with_missing_headers(names)
        }
        None => ErrorResponse::new(err.status, err.message.as_str()),
    };
    (err.status, envelope.into())
}

fn decode_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    Some(
        serde_json::from_slice(body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
    )
}
