#![allow(clippy::missing_errors_doc)] // domain and repository errors are documented on their enums
#![allow(clippy::must_use_candidate)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Service channels module.
//!
//! - ATM records behind a CRUD API, plus read-only ATM and presential
//!   channel catalogues
//! - Electronic channel, phone channel and customer data ingestion: a Pub/Sub
//!   push announces an object, every line of it is transformed and published
//!   to the topics configured for that feed
//! - Orchestration routes that read ATM and presential channel records from
//!   upstream services
//!
//! ```text
//!  REST (/service-channels/v1/api/...)
//!        │
//!        ├── Service ──► AtmRepository / AutomatedTellerMachineRepository
//!        │                / PresentialChannelRepository
//!        │
//!        ├── IngestionPipeline ─► ObjectStore ─► RecordTransform ─► MessagePublisher
//!        │
//!        └── Orchestrator ─► UpstreamClient
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod ingestion;
pub mod module;
pub mod orchestration;

pub use config::{ConfigError, ServiceChannelsConfig, UpstreamConfig};
pub use module::{Adapters, ServiceChannels};
