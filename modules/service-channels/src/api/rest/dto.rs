//! REST response bodies.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "UP",
            message: "API is healthy",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `{"data": ...}` wrapper used by the read-model endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushResponse {
    pub status: &'static str,
    pub data_count: usize,
}

/// Body of the router fallback.
#[derive(Debug, Clone, Serialize)]
pub struct NotFoundResponse {
    pub error: &'static str,
}
