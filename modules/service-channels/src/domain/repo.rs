//! Repository traits for the channel catalogue.

use async_trait::async_trait;

use super::models::{Atm, AutomatedTellerMachine, PresentialChannel};

/// Result of a write that keeps `atm_identifier` unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtmWrite {
    Stored(Atm),
    /// Another record already holds the identifier; nothing was written.
    DuplicateIdentifier,
    /// No record with the target id; nothing was written.
    Missing,
}

/// Read/write store behind the ATM CRUD endpoints.
///
/// Implementations enforce identifier uniqueness inside `create` and
/// `update`, so concurrent writers cannot both claim one identifier.
#[async_trait]
pub trait AtmRepository: Send + Sync {
    /// Insert a record with a freshly assigned id.
    async fn create(&self, atm: Atm) -> anyhow::Result<AtmWrite>;

    /// All records, ordered by id.
    async fn list(&self) -> anyhow::Result<Vec<Atm>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Atm>>;

    /// Replace the record with `atm.id`.
    async fn update(&self, atm: Atm) -> anyhow::Result<AtmWrite>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait AutomatedTellerMachineRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<AutomatedTellerMachine>>;

    async fn find(&self, atm_identifier: &str) -> anyhow::Result<Option<AutomatedTellerMachine>>;
}

#[async_trait]
pub trait PresentialChannelRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<PresentialChannel>>;

    async fn find(&self, channel_identifier: &str) -> anyhow::Result<Option<PresentialChannel>>;
}
