//! Canonical response envelope and error taxonomy for service channels.
//!
//! This crate holds the pure data model of every response body (`Result`
//! envelope with `OK`/`ERROR` status), the typed [`AppError`], and the
//! [`classify`] step that picks the envelope for a handled request. With the
//! `axum` feature it can also render envelopes as HTTP responses.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod app_error;
pub mod classify;
pub mod envelope;
#[cfg(feature = "axum")]
pub mod response;

pub use app_error::{AppError, DATABASE_FAILURE_MARKER, MISSING_HEADERS_PREFIX, RecordedError};
pub use classify::{UNEXPECTED_ERROR_DESCRIPTION, classify};
pub use envelope::{
    CanonicalError, CanonicalErrorType, ERROR_SOURCE, ErrorResponse, ErrorResult,
    ErrorSourceDetails, ResponseEnvelope, ResultStatus, SUCCESS_DESCRIPTION, SourceError,
    SuccessResponse, SuccessResult,
};
#[cfg(feature = "axum")]
pub use response::{APPLICATION_JSON, INTERNAL_ERROR_BODY, render};
