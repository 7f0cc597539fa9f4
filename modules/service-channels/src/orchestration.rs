//! Read-through routes to the upstream channel services.
//!
//! A lookup forwards the caller's headers to `<base url>/<id>`, then unwraps
//! the upstream envelope down to `Result.data.data`.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, header};
use serde_json::{Map, Value};

use crate::config::UpstreamConfig;
use crate::domain::ports::UpstreamClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamResource {
    AutomatedTellerMachine,
    PresentialChannel,
}

impl fmt::Display for UpstreamResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AutomatedTellerMachine => "ATM",
            Self::PresentialChannel => "Presential Channel",
        })
    }
}

/// Client-facing failures; the cause is kept as the error source.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("Failed to fetch {resource} data")]
    Fetch {
        resource: UpstreamResource,
        #[source]
        source: anyhow::Error,
    },
    #[error("Failed to transform {resource} data")]
    Transform {
        resource: UpstreamResource,
        #[source]
        source: serde_json::Error,
    },
}

pub struct Orchestrator {
    client: Arc<dyn UpstreamClient>,
    automated_teller_machines_url: Option<String>,
    presential_channels_url: Option<String>,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn UpstreamClient>, config: &UpstreamConfig) -> Self {
        Self {
            client,
            automated_teller_machines_url: config.automated_teller_machines_url.clone(),
            presential_channels_url: config.presential_channels_url.clone(),
        }
    }

    fn base_url(&self, resource: UpstreamResource) -> Option<&str> {
        match resource {
            UpstreamResource::AutomatedTellerMachine => {
                self.automated_teller_machines_url.as_deref()
            }
            UpstreamResource::PresentialChannel => self.presential_channels_url.as_deref(),
        }
    }

    /// Fetch one record from the upstream service for `resource`.
    ///
    /// # Errors
    /// [`OrchestrationError::Fetch`] when no URL is configured or the request
    /// fails; [`OrchestrationError::Transform`] when the body is not a JSON
    /// object.
    pub async fn fetch(
        &self,
        resource: UpstreamResource,
        id: &str,
        headers: &[(String, String)],
    ) -> Result<Value, OrchestrationError> {
        let base = self
            .base_url(resource)
            .ok_or_else(|| OrchestrationError::Fetch {
                resource,
                source: anyhow::anyhow!("no upstream URL configured"),
            })?;
        let url = format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(id));

        let body = self.client.get(&url, headers).await.map_err(|source| {
            tracing::error!(url = %url, error = %format!("{source:#}"), "upstream fetch failed");
            OrchestrationError::Fetch { resource, source }
        })?;
        unwrap_result_data(&body).map_err(|source| {
            tracing::error!(url = %url, error = %source, "upstream body is not an envelope");
            OrchestrationError::Transform { resource, source }
        })
    }
}

/// `Result.data.data` of an upstream envelope; `null` when any level is
/// missing.
///
/// # Errors
/// Fails when `body` is not a JSON object.
pub fn unwrap_result_data(body: &[u8]) -> Result<Value, serde_json::Error> {
    let envelope: Map<String, Value> = serde_json::from_slice(body)?;
    Ok(envelope
        .get("Result")
        .and_then(|result| result.pointer("/data/data"))
        .cloned()
        .unwrap_or(Value::Null))
}

/// First value of every request header, minus the hop headers and values
/// that are not visible ASCII.
pub fn forwarded_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .keys()
        .filter(|name| !is_hop_header(name))
        .filter_map(|name| {
            let value = headers.get(name)?.to_str().ok()?;
            Some((name.as_str().to_owned(), value.to_owned()))
        })
        .collect()
}

/// Headers that describe this hop rather than the request.
fn is_hop_header(name: &HeaderName) -> bool {
    [
        header::HOST,
        header::CONTENT_LENGTH,
        header::CONNECTION,
        header::TRANSFER_ENCODING,
    ]
    .contains(name)
}
