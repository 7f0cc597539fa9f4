//! REST error mapping for service channels.

use axum::Json;
use axum::extract::rejection::JsonRejection;

use channels_errors::AppError;
use channels_http::ApiError;

use crate::domain::error::DomainError;
use crate::ingestion::{IngestError, PipelineError};
use crate::orchestration::OrchestrationError;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(message) => AppError::not_found(message).into(),
            DomainError::Validation { .. } => AppError::bad_request(e.to_string()).into(),
            DomainError::Conflict(message) => AppError::conflict(message).into(),
            DomainError::Storage(_) => ApiError::untyped(e),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        AppError::bad_request(e.to_string()).into()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::untyped(e)
    }
}

/// Only the client-facing message is reported; the cause is logged upstream.
impl From<OrchestrationError> for ApiError {
    fn from(e: OrchestrationError) -> Self {
        ApiError::untyped(e)
    }
}

/// Unwrap a JSON body, turning extractor rejections into typed 400 errors.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::bad_request(rejection.body_text()).into()),
    }
}

/// Parse an ATM id path segment.
pub(crate) fn parse_atm_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::bad_request(format!("Invalid ATM id: {raw}")).into())
}
