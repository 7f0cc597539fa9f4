//! Canonical response envelope (pure data model, no HTTP framework dependencies)

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description carried by every success envelope.
pub const SUCCESS_DESCRIPTION: &str = "Request processed successfully";

/// `ErrorSourceDetails.source` for every error raised by this service.
pub const ERROR_SOURCE: &str = "API";

/// Overall outcome carried in `Result.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    Ok,
    Error,
    /// Reserved; no classification rule produces it.
    Warning,
}

/// Error taxonomy code carried in `CanonicalError.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CanonicalErrorType {
    /// Business rule violation.
    Neg,
    /// Technical failure.
    Tec,
    /// Security failure.
    Seg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct SuccessResponse {
    #[serde(rename = "Result")]
    pub result: SuccessResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResult {
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl SuccessResponse {
    /// Success envelope around an optional payload.
    pub fn new(data: Option<Value>) -> Self {
        Self {
            result: SuccessResult {
                status: ResultStatus::Ok,
                description: Some(SUCCESS_DESCRIPTION.to_owned()),
                data,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct ErrorResponse {
    #[serde(rename = "Result")]
    pub result: ErrorResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub status: ResultStatus,
    #[serde(rename = "CanonicalError")]
    pub canonical_error: CanonicalError,
    #[serde(rename = "SourceError")]
    pub source_error: SourceError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalError {
    pub code: String,
    #[serde(rename = "type")]
    pub error_type: CanonicalErrorType,
    /// Reason phrase of the status code, empty when the code has none.
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceError {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "ErrorSourceDetails")]
    pub details: ErrorSourceDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSourceDetails {
    pub source: String,
    #[serde(
        rename = "missingHeaders",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub missing_headers: Option<Vec<String>>,
}

impl ErrorResponse {
    /// Technical error envelope for `status`, with `description` as the source message.
    pub fn new(status: StatusCode, description: impl Into<String>) -> Self {
        let code = status.as_u16().to_string();
        Self {
            result: ErrorResult {
                status: ResultStatus::Error,
                canonical_error: CanonicalError {
                    code: code.clone(),
                    error_type: CanonicalErrorType::Tec,
                    description: status.canonical_reason().unwrap_or_default().to_owned(),
                },
                source_error: SourceError {
                    code,
                    description: description.into(),
                    details: ErrorSourceDetails {
                        source: ERROR_SOURCE.to_owned(),
                        missing_headers: None,
                    },
                },
            },
        }
    }

    pub fn with_missing_headers(mut self, headers: Vec<String>) -> Self {
        self.result.source_error.details.missing_headers = Some(headers);
        self
    }
}

/// Exactly one envelope is produced per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Error(ErrorResponse),
    Success(SuccessResponse),
}

impl ResponseEnvelope {
    #[must_use]
    pub fn status(&self) -> ResultStatus {
        match self {
            Self::Success(s) => s.result.status,
            Self::Error(e) => e.result.status,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Encode with the pruning serializer.
    ///
    /// # Errors
    /// Returns [`channels_json::EncodeError`] when the payload has no JSON form.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, channels_json::EncodeError> {
        channels_json::to_vec(self)
    }
}

impl From<SuccessResponse> for ResponseEnvelope {
    fn from(value: SuccessResponse) -> Self {
        Self::Success(value)
    }
}

impl From<ErrorResponse> for ResponseEnvelope {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}
