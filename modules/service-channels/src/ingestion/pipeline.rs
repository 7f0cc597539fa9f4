//! Object to topics ingestion.
//!
//! A batch is every line of one object. Records are transformed and encoded
//! first, then published in order to every configured topic. The first
//! failure at any step aborts the batch and nothing after it is published,
//! unless the pipeline skips invalid records: then transform and encode
//! failures are logged and the record is left out.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use channels_json::EncodeError;

use super::push::StorageEvent;
use super::transform::{RecordTransform, TransformError};
use crate::domain::ports::{MessagePublisher, ObjectStore, RawRecord};

/// One topic that rejected a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFailure {
    pub topic: String,
    pub error: String,
}

impl fmt::Display for PublishFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to publish message to topic {}: {}",
            self.topic, self.error
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Error processing file: {0:#}")]
    Read(anyhow::Error),
    #[error("Error transforming channel data: {0}")]
    Transform(TransformError),
    #[error("Error marshaling channel data: {0}")]
    Encode(EncodeError),
    #[error("Error publishing message: errors occurred while publishing: {}", join_failures(.0))]
    Publish(Vec<PublishFailure>),
}

fn join_failures(failures: &[PublishFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Outcome of a completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Records read from the object.
    pub records: usize,
    /// Records left out because they failed to transform or encode.
    pub skipped: usize,
    /// Messages accepted across all topics.
    pub published: usize,
}

/// What a batch does with a record that fails to transform or encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRecordPolicy {
    #[default]
    Abort,
    Skip,
}

pub struct IngestionPipeline<T> {
    store: Arc<dyn ObjectStore>,
    publisher: Arc<dyn MessagePublisher>,
    transform: T,
    topics: Vec<String>,
    on_invalid: InvalidRecordPolicy,
}

impl<T: RecordTransform> IngestionPipeline<T> {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        publisher: Arc<dyn MessagePublisher>,
        transform: T,
        topics: Vec<String>,
    ) -> Self {
        Self {
            store,
            publisher,
            transform,
            topics,
            on_invalid: InvalidRecordPolicy::Abort,
        }
    }

    #[must_use]
    pub fn with_invalid_record_policy(mut self, policy: InvalidRecordPolicy) -> Self {
        self.on_invalid = policy;
        self
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Read the announced object and publish every record.
    ///
    /// # Errors
    /// Returns the first [`PipelineError`] met; records after it are not
    /// published. With [`InvalidRecordPolicy::Skip`] only read and publish
    /// failures end the batch.
    pub async fn run(&self, event: &StorageEvent) -> Result<IngestReport, PipelineError> {
        let records = self
            .store
            .read_records(&event.name)
            .await
            .map_err(PipelineError::Read)?;

        let mut encoded = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for (index, record) in records.iter().enumerate() {
            match self.encode(record) {
                Ok(bytes) => encoded.push(bytes),
                Err(err) if self.on_invalid == InvalidRecordPolicy::Skip => {
                    tracing::warn!(object = %event.name, index, error = %err, "record skipped");
                    skipped += 1;
                }
                Err(err) => {
                    tracing::warn!(object = %event.name, index, error = %err, "record rejected");
                    return Err(err);
                }
            }
        }

        let mut published = 0;
        for payload in encoded {
            published += self.publish_everywhere(payload).await?;
        }

        tracing::info!(
            bucket = %event.bucket,
            object = %event.name,
            records = records.len(),
            skipped,
            published,
            "batch published"
        );
        Ok(IngestReport {
            records: records.len(),
            skipped,
            published,
        })
    }

    fn encode(&self, record: &RawRecord) -> Result<Bytes, PipelineError> {
        let model = self
            .transform
            .transform(record)
            .map_err(PipelineError::Transform)?;
        let bytes = channels_json::to_vec(&model).map_err(PipelineError::Encode)?;
        Ok(Bytes::from(bytes))
    }

    /// Publish to every topic; failures are collected per topic.
    async fn publish_everywhere(&self, payload: Bytes) -> Result<usize, PipelineError> {
        let mut failures = Vec::new();
        let mut accepted = 0;
        for topic in &self.topics {
            match self.publisher.publish(topic, payload.clone()).await {
                Ok(message_id) => {
                    accepted += 1;
                    tracing::debug!(topic = %topic, message_id = %message_id, "message accepted");
                }
                Err(err) => {
                    tracing::error!(topic = %topic, error = %format!("{err:#}"), "publish failed");
                    failures.push(PublishFailure {
                        topic: topic.clone(),
                        error: format!("{err:#}"),
                    });
                }
            }
        }
        if failures.is_empty() {
            Ok(accepted)
        } else {
            Err(PipelineError::Publish(failures))
        }
    }
}
