//! Handler responder that encodes with the canonical serializer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Like `axum::Json`, but pruned on the way out.
///
/// Use it for bodies holding values whose emptiness is only visible through
/// their type, such as `channels_json::Timestamp`: once a body is plain
/// JSON text, the epoch timestamp reads as an ordinary string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalJson<T>(pub T);

impl<T: Serialize> IntoResponse for CanonicalJson<T> {
    fn into_response(self) -> Response {
        channels_errors::render(StatusCode::OK, &self.0)
    }
}
