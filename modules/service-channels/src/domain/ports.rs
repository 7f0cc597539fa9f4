//! Outbound ports used by ingestion and the orchestration routes.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};

/// One decoded line of a newline-delimited JSON object.
pub type RawRecord = Map<String, Value>;

/// Read access to the objects announced by storage notifications.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read `name` and decode every non-blank line as a JSON object.
    async fn read_records(&self, name: &str) -> anyhow::Result<Vec<RawRecord>>;
}

/// Publishes encoded payloads to a topic.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish `payload` to `topic`, returning the message id.
    async fn publish(&self, topic: &str, payload: Bytes) -> anyhow::Result<String>;
}

/// Reads JSON documents from the upstream channel services.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// GET `url` with `headers`; any status other than 200 is an error.
    async fn get(&self, url: &str, headers: &[(String, String)]) -> anyhow::Result<Bytes>;
}
