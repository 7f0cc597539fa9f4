//! Channel and customer ingestion: push notification, object read, transform, publish.

pub mod pipeline;
pub mod push;
pub mod transform;

pub use pipeline::{
    IngestReport, IngestionPipeline, InvalidRecordPolicy, PipelineError, PublishFailure,
};
pub use push::{IngestError, StorageEvent, decode_push_message};
pub use transform::{
    CustomerDataTransform, ElectronicChannelsTransform, PhoneChannelsTransform, RecordTransform,
    TransformError,
};

/// Pipeline wired with the electronic channels transform.
pub type ElectronicChannelsPipeline = IngestionPipeline<ElectronicChannelsTransform>;

/// Pipeline wired with the phone and SMS channels transform.
pub type PhoneChannelsPipeline = IngestionPipeline<PhoneChannelsTransform>;

/// Pipeline wired with the customer data transform; skips invalid records.
pub type CustomerDataPipeline = IngestionPipeline<CustomerDataTransform>;
