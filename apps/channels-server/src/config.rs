//! Layered server configuration.
//!
//! 1) defaults -> 2) YAML (`--config`) -> 3) env (`CHANNELS__*`, `__` nesting)
//! -> 4) CLI overrides.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use channels_http::{ContractLayerConfig, TraceabilityRules};
use service_channels::ServiceChannelsConfig;

pub const ENV_PREFIX: &str = "CHANNELS__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub traceability: TraceabilityConfig,
    pub service_channels: ServiceChannelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Maximum accepted request body, in bytes.
    pub body_limit_bytes: usize,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let contract = ContractLayerConfig::default();
        Self {
            bind_addr: "0.0.0.0".to_owned(),
            port: 8080,
            body_limit_bytes: contract.body_limit_bytes,
            request_timeout_secs: contract.request_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

/// System codes accepted on top of the built-in consumer table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceabilityConfig {
    pub system_codes: BTreeMap<String, String>,
}

impl AppConfig {
    /// Load the layered configuration.
    ///
    /// # Errors
    /// Fails when a layer cannot be parsed into [`AppConfig`].
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))
    }

    pub fn apply_cli_overrides(&mut self, port: Option<u16>) {
        if let Some(port) = port {
            self.server.port = port;
        }
    }

    /// # Errors
    /// Returns the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.body_limit_bytes > 0,
            "server.body_limit_bytes must be positive"
        );
        anyhow::ensure!(
            self.server.request_timeout_secs > 0,
            "server.request_timeout_secs must be positive"
        );
        if let Some((code, _)) = self
            .traceability
            .system_codes
            .iter()
            .find(|(code, name)| code.trim().is_empty() || name.trim().is_empty())
        {
            anyhow::bail!("traceability.system_codes has an empty entry: {code:?}");
        }
        self.service_channels
            .validate()
            .context("invalid service_channels config")?;
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }

    pub fn contract_layers(&self) -> ContractLayerConfig {
        ContractLayerConfig {
            body_limit_bytes: self.server.body_limit_bytes,
            request_timeout: Duration::from_secs(self.server.request_timeout_secs),
            ..ContractLayerConfig::default()
        }
    }

    pub fn traceability_rules(&self) -> TraceabilityRules {
        TraceabilityRules::with_system_codes(self.traceability.system_codes.clone())
    }

    /// # Errors
    /// Fails if the configuration cannot be serialized.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize configuration")
    }
}
