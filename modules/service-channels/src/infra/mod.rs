pub mod memory;
pub mod object_store;
pub mod publisher;
pub mod seed;
pub mod upstream;

pub use memory::{
    InMemoryAtmRepository, InMemoryAutomatedTellerMachineRepository,
    InMemoryPresentialChannelRepository,
};
pub use object_store::FsObjectStore;
pub use publisher::{LoggingPublisher, PublishedMessage, RecordingPublisher};
pub use seed::SeedData;
pub use upstream::{HttpUpstreamClient, StaticUpstream, UpstreamRequest};
