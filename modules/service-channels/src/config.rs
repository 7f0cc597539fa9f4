//! Service channels module configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Route prefix used when none is configured.
pub const DEFAULT_API_PREFIX: &str = "/service-channels/v1/api";

/// Topic used when none is configured.
pub const DEFAULT_TOPIC: &str = "electronic-channels";
pub const DEFAULT_PHONE_CHANNEL_TOPIC: &str = "phone-channels";
pub const DEFAULT_CUSTOMER_DATA_TOPIC: &str = "customer-data";

/// Upstream request timeout used when none is configured.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Service channels module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceChannelsConfig {
    /// Prefix every module route is mounted under.
    pub api_prefix: String,
    /// Directory the filesystem object store reads pushed objects from.
    pub storage_root: PathBuf,
    /// Topics every electronic channel record is published to.
    pub topics: Vec<String>,
    /// Topics every phone and SMS channel record is published to.
    pub phone_channel_topics: Vec<String>,
    /// Topics every customer record is published to.
    pub customer_data_topics: Vec<String>,
    /// Optional JSON file the in-memory repositories are seeded from.
    pub seed_file: Option<PathBuf>,
    pub upstream: UpstreamConfig,
}

impl Default for ServiceChannelsConfig {
    fn default() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            storage_root: PathBuf::from("data/objects"),
            topics: vec![DEFAULT_TOPIC.to_owned()],
            phone_channel_topics: vec![DEFAULT_PHONE_CHANNEL_TOPIC.to_owned()],
            customer_data_topics: vec![DEFAULT_CUSTOMER_DATA_TOPIC.to_owned()],
            seed_file: None,
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Upstream channel services behind the orchestration routes.
///
/// An unset URL leaves its route answering with a fetch failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Base URL; the requested id is appended as the last path segment.
    pub automated_teller_machines_url: Option<String>,
    pub presential_channels_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            automated_teller_machines_url: None,
            presential_channels_url: None,
            timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("api_prefix must start with '/': {0:?}")]
    InvalidPrefix(String),
    #[error("topic names must not be empty")]
    EmptyTopic,
    #[error("duplicate topic: {0}")]
    DuplicateTopic(String),
    #[error("upstream URL must be http(s): {0:?}")]
    InvalidUpstreamUrl(String),
    #[error("upstream.timeout_secs must be positive")]
    ZeroUpstreamTimeout,
}

impl ServiceChannelsConfig {
    /// Check the values serde cannot.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for a malformed prefix, topic list or upstream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(ConfigError::InvalidPrefix(self.api_prefix.clone()));
        }
        for topics in [
            &self.topics,
            &self.phone_channel_topics,
            &self.customer_data_topics,
        ] {
            validate_topics(topics)?;
        }
        self.upstream.validate()
    }

    /// Prefix without a trailing slash; empty means the routes sit at the root.
    #[must_use]
    pub fn normalized_prefix(&self) -> &str {
        self.api_prefix.trim_end_matches('/')
    }
}

impl UpstreamConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroUpstreamTimeout);
        }
        let urls = [
            &self.automated_teller_machines_url,
            &self.presential_channels_url,
        ];
        for url in urls.into_iter().flatten() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUpstreamUrl(url.clone()));
            }
        }
        Ok(())
    }
}

fn validate_topics(topics: &[String]) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();
    for topic in topics {
        if topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if !seen.insert(topic.as_str()) {
            return Err(ConfigError::DuplicateTopic(topic.clone()));
        }
    }
    Ok(())
}
