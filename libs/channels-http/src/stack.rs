//! Contract middleware stack.
//!
//! Runtime order, outermost first:
//! `Trace` → response wrapper → catch panic → timeout → body limit → routes.
//! Traceability is attached per route group with [`with_traceability`].

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response, StatusCode};
use axum::middleware::from_fn_with_state;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

use crate::response_wrapper::{
    DEFAULT_RESPONSE_BUFFER_LIMIT, WrapperState, response_wrapper_middleware,
};
use crate::traceability::{TraceabilityRules, traceability_middleware};

#[derive(Debug, Clone, Copy)]
pub struct ContractLayerConfig {
    /// Maximum accepted request body.
    pub body_limit_bytes: usize,
    /// Requests running longer are answered with 504.
    pub request_timeout: Duration,
    /// Maximum handler body the wrapper buffers.
    pub response_buffer_limit: usize,
}

impl Default for ContractLayerConfig {
    fn default() -> Self {
        Self {
            body_limit_bytes: 2 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            response_buffer_limit: DEFAULT_RESPONSE_BUFFER_LIMIT,
        }
    }
}

/// Apply the contract middleware stack to a fully routed router.
#[must_use]
pub fn apply_contract_layers(mut router: Router, config: &ContractLayerConfig) -> Router {
    // Registration order is innermost first.
    router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));
    router = router.layer(DefaultBodyLimit::max(config.body_limit_bytes));
    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        config.request_timeout,
    ));
    router = router.layer(CatchPanicLayer::custom(panic_response));
    router = router.layer(from_fn_with_state(
        WrapperState {
            body_limit: config.response_buffer_limit,
        },
        response_wrapper_middleware,
    ));
    apply_trace_layer(router)
}

/// Require traceability headers on every route of `router`.
#[must_use]
pub fn with_traceability<S>(router: Router<S>, rules: Arc<TraceabilityRules>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(from_fn_with_state(rules, traceability_middleware))
}

/// Plain 500 for a panicking handler; the wrapper reports it as unexpected.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = %detail, "handler panicked");

    let mut resp = Response::new(Body::empty());
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    trace_source_id = req
                        .headers()
                        .get(crate::traceability::TRACE_SOURCE_ID)
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("n/a"),
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(
                |res: &Response<Body>, latency: Duration, span: &tracing::Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                },
            ),
    )
}
