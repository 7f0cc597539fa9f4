use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;

use channels_http::TraceabilityRules;

use crate::api::rest::routes::{self, ApiState};
use crate::config::ServiceChannelsConfig;
use crate::domain::ports::{MessagePublisher, ObjectStore, UpstreamClient};
use crate::domain::service::Service;
use crate::infra::{
    FsObjectStore, HttpUpstreamClient, InMemoryAtmRepository,
    InMemoryAutomatedTellerMachineRepository, InMemoryPresentialChannelRepository,
    LoggingPublisher, SeedData,
};
use crate::ingestion::{
    CustomerDataPipeline, CustomerDataTransform, ElectronicChannelsPipeline,
    ElectronicChannelsTransform, InvalidRecordPolicy, PhoneChannelsPipeline,
    PhoneChannelsTransform,
};
use crate::orchestration::Orchestrator;

/// Outbound adapters the module is wired with.
pub struct Adapters {
    pub store: Arc<dyn ObjectStore>,
    pub publisher: Arc<dyn MessagePublisher>,
    pub upstream: Arc<dyn UpstreamClient>,
}

/// The service channels module: catalogue service, ingestion pipelines,
/// orchestrator and routes.
pub struct ServiceChannels {
    config: ServiceChannelsConfig,
    state: ApiState,
}

impl ServiceChannels {
    /// Wire the module from configuration: in-memory repositories (seeded when
    /// a seed file is configured), the filesystem object store, the logging
    /// publisher and the HTTP upstream client.
    ///
    /// # Errors
    /// Fails on invalid configuration, an unusable seed file or when the HTTP
    /// client cannot be built.
    pub async fn init(config: ServiceChannelsConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid service_channels config")?;

        let seed = match &config.seed_file {
            Some(path) => SeedData::load(path).await?,
            None => SeedData::default(),
        };
        let atms = InMemoryAtmRepository::with_records(seed.atms).context("invalid seed data")?;
        let service = Service::new(
            Arc::new(atms),
            Arc::new(InMemoryAutomatedTellerMachineRepository::with_records(
                seed.automated_teller_machines,
            )),
            Arc::new(InMemoryPresentialChannelRepository::with_records(
                seed.presential_channels,
            )),
        );

        let upstream = HttpUpstreamClient::new(Duration::from_secs(config.upstream.timeout_secs))?;
        let adapters = Adapters {
            store: Arc::new(FsObjectStore::new(config.storage_root.clone())),
            publisher: Arc::new(LoggingPublisher),
            upstream: Arc::new(upstream),
        };
        let module = Self::with_parts(config, service, adapters);
        tracing::info!(
            prefix = module.config.normalized_prefix(),
            electronic_topics = ?module.state.electronic_channels.topics(),
            phone_topics = ?module.state.phone_channels.topics(),
            customer_topics = ?module.state.customer_data.topics(),
            "service channels module initialized"
        );
        Ok(module)
    }

    /// Wire the module from explicit parts.
    pub fn with_parts(config: ServiceChannelsConfig, service: Service, adapters: Adapters) -> Self {
        let Adapters {
            store,
            publisher,
            upstream,
        } = adapters;
        let electronic_channels = ElectronicChannelsPipeline::new(
            store.clone(),
            publisher.clone(),
            ElectronicChannelsTransform,
            config.topics.clone(),
        );
        let phone_channels = PhoneChannelsPipeline::new(
            store.clone(),
            publisher.clone(),
            PhoneChannelsTransform,
            config.phone_channel_topics.clone(),
        );
        let customer_data = CustomerDataPipeline::new(
            store,
            publisher,
            CustomerDataTransform,
            config.customer_data_topics.clone(),
        )
        .with_invalid_record_policy(InvalidRecordPolicy::Skip);
        let orchestrator = Orchestrator::new(upstream, &config.upstream);

        Self {
            state: ApiState {
                service: Arc::new(service),
                electronic_channels: Arc::new(electronic_channels),
                phone_channels: Arc::new(phone_channels),
                customer_data: Arc::new(customer_data),
                orchestrator: Arc::new(orchestrator),
            },
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServiceChannelsConfig {
        &self.config
    }

    /// Routes of this module, without the contract layers.
    pub fn router(&self, rules: Arc<TraceabilityRules>) -> Router {
        routes::router(self.config.normalized_prefix(), self.state.clone(), rules)
    }
}
