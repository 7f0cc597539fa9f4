//! Upstream HTTP clients.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::domain::ports::UpstreamClient;

/// `reqwest` client with a whole-request timeout.
#[derive(Debug, Clone)]
pub struct HttpUpstreamClient {
    client: reqwest::Client,
}

impl HttpUpstreamClient {
    /// # Errors
    /// Fails when the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build upstream HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> anyhow::Result<Bytes> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        anyhow::ensure!(
            status == reqwest::StatusCode::OK,
            "received non-200 response: {status}"
        );
        response
            .bytes()
            .await
            .with_context(|| format!("failed to read response body from {url}"))
    }
}

/// A request seen by [`StaticUpstream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Answers from a fixed URL to body table; unknown URLs fail like a 404.
#[derive(Debug, Default)]
pub struct StaticUpstream {
    bodies: HashMap<String, Bytes>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl StaticUpstream {
    #[must_use]
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl UpstreamClient for StaticUpstream {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> anyhow::Result<Bytes> {
        self.requests.lock().push(UpstreamRequest {
            url: url.to_owned(),
            headers: headers.to_vec(),
        });
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("received non-200 response: 404 Not Found"))
    }
}
