//! Response wrapper middleware.
//!
//! Every response leaving the service is rebuilt here as a canonical envelope.
//!
//! # Behavior
//!
//! - An [`ErrorSink`] is installed in the request extensions before the
//!   handler runs.
//! - The handler body is buffered (up to [`WrapperState::body_limit`]).
//! - Errors from the sink and from the response extensions
//!   ([`RecordedErrors`]) are merged, oldest first.
//! - [`channels_errors::classify`] picks status and envelope, which is then
//!   encoded with the pruning serializer.
//! - Headers set by inner layers survive, except `content-length` and
//!   `content-type`.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use bytes::Bytes;

use channels_errors::RecordedError;

use crate::error::{ErrorSink, RecordedErrors};

/// Upper bound for a buffered handler body when none is configured.
pub const DEFAULT_RESPONSE_BUFFER_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct WrapperState {
    /// Maximum number of body bytes read from the inner response.
    pub body_limit: usize,
}

impl Default for WrapperState {
    fn default() -> Self {
        Self {
            body_limit: DEFAULT_RESPONSE_BUFFER_LIMIT,
        }
    }
}

/// Wrap the inner response in the canonical envelope.
pub async fn response_wrapper_middleware(
    State(state): State<WrapperState>,
    mut req: Request,
    next: Next,
) -> Response {
    let sink = ErrorSink::default();
    req.extensions_mut().insert(sink.clone());
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    let (mut parts, body) = response.into_parts();
    let mut errors = sink.take();
    if let Some(RecordedErrors(recorded)) = parts.extensions.remove::<RecordedErrors>() {
        errors.extend(recorded);
    }

    let body = match axum::body::to_bytes(body, state.body_limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(
                method = %method,
                path = %path,
                error = %err,
                "failed to read handler response body"
            );
            errors.push(RecordedError::untyped(format!(
                "failed to read response body: {err}"
            )));
            Bytes::new()
        }
    };

    let (status, envelope) = channels_errors::classify(parts.status, &errors, &body);

    if let Some(last) = errors.last() {
        if last.is_infrastructure_failure() {
            tracing::error!(method = %method, path = %path, error = %last, "storage failure");
        } else {
            tracing::debug!(
                method = %method,
                path = %path,
                error = %last,
                "request ended with error"
            );
        }
    }
    tracing::debug!(
        method = %method,
        path = %path,
        inner_status = parts.status.as_u16(),
        status = status.as_u16(),
        success = envelope.is_success(),
        "response wrapped"
    );

    let mut resp = channels_errors::render(status, &envelope);
    carry_headers(&mut parts.headers, resp.headers_mut());
    *resp.extensions_mut() = parts.extensions;
    resp
}

fn carry_headers(inner: &mut HeaderMap, outer: &mut HeaderMap) {
    inner.remove(header::CONTENT_LENGTH);
    inner.remove(header::CONTENT_TYPE);
    outer.extend(std::mem::take(inner));
}
