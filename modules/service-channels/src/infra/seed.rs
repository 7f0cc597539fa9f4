use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::domain::models::{Atm, AutomatedTellerMachine, PresentialChannel};

/// Initial repository contents loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedData {
    pub atms: Vec<Atm>,
    pub automated_teller_machines: Vec<AutomatedTellerMachine>,
    pub presential_channels: Vec<PresentialChannel>,
}

impl SeedData {
    /// Read and parse a JSON seed file.
    ///
    /// # Errors
    /// Fails when the file cannot be read or is not a valid seed document.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        let seed: Self = serde_json::from_str(&text)
            .with_context(|| format!("invalid seed file {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            atms = seed.atms.len(),
            automated_teller_machines = seed.automated_teller_machines.len(),
            presential_channels = seed.presential_channels.len(),
            "seed data loaded"
        );
        Ok(seed)
    }
}
