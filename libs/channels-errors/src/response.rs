//! Axum integration: turn a classified envelope into an HTTP response.

use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Content type of every canonical response.
pub const APPLICATION_JSON: &str = "application/json";

/// Body sent when the envelope itself cannot be encoded.
pub const INTERNAL_ERROR_BODY: &str = r#"{"error": "Internal Server Error"}"#;

/// Encode `envelope` canonically and pair it with `status`.
///
/// An envelope that fails to encode degrades to a fixed 500 with
/// [`INTERNAL_ERROR_BODY`].
#[must_use]
pub fn render<T: Serialize + ?Sized>(status: StatusCode, envelope: &T) -> Response {
    match channels_json::to_vec(envelope) {
        Ok(bytes) => json_response(status, Body::from(bytes)),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode response envelope");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Body::from(INTERNAL_ERROR_BODY),
            )
        }
    }
}

fn json_response(status: StatusCode, body: Body) -> Response {
    let mut resp = (status, body).into_response();
    resp.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    resp
}
