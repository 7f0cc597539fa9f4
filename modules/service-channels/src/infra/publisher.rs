//! Message publishers.

use std::collections::HashSet;

use anyhow::bail;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::ports::MessagePublisher;

/// Publisher that only logs what it would send.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPublisher;

#[async_trait]
impl MessagePublisher for LoggingPublisher {
    async fn publish(&self, topic: &str, payload: Bytes) -> anyhow::Result<String> {
        let message_id = Uuid::new_v4().to_string();
        tracing::info!(
            topic,
            message_id = %message_id,
            bytes = payload.len(),
            payload = %String::from_utf8_lossy(&payload),
            "message published"
        );
        Ok(message_id)
    }
}

/// A message captured by [`RecordingPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Bytes,
}

/// Keeps every published message in memory. Topics registered with
/// [`RecordingPublisher::fail_topic`] reject publishes.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingPublisher {
    pub fn fail_topic(&self, topic: impl Into<String>) {
        self.failing.lock().insert(topic.into());
    }

    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: Bytes) -> anyhow::Result<String> {
        if self.failing.lock().contains(topic) {
            bail!("topic {topic} rejected the message");
        }
        let mut messages = self.messages.lock();
        messages.push(PublishedMessage {
            topic: topic.to_owned(),
            payload,
        });
        Ok(messages.len().to_string())
    }
}
