//! `DashMap`-backed repositories.

use anyhow::Context;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::domain::models::{Atm, AutomatedTellerMachine, PresentialChannel};
use crate::domain::repo::{
    AtmRepository, AtmWrite, AutomatedTellerMachineRepository, PresentialChannelRepository,
};

/// ATM rows plus an identifier index.
///
/// Reads are lock-free; writes hold `writes` so the uniqueness check and the
/// insert happen as one step.
#[derive(Debug)]
pub struct InMemoryAtmRepository {
    rows: DashMap<i64, Atm>,
    by_identifier: DashMap<String, i64>,
    /// Next id to assign; guarded with every write.
    writes: Mutex<i64>,
}

impl Default for InMemoryAtmRepository {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
            by_identifier: DashMap::new(),
            writes: Mutex::new(1),
        }
    }
}

impl InMemoryAtmRepository {
    /// Seeded records keep their ids; new ids continue after the largest one.
    ///
    /// # Errors
    /// Fails on repeated ids or identifiers, or when no id is left after the
    /// largest seeded one.
    pub fn with_records(records: impl IntoIterator<Item = Atm>) -> anyhow::Result<Self> {
        let repo = Self::default();
        let mut max_id = 0;
        for atm in records {
            anyhow::ensure!(
                !repo.rows.contains_key(&atm.id),
                "seeded ATM id {} appears more than once",
                atm.id
            );
            anyhow::ensure!(
                !repo.by_identifier.contains_key(&atm.atm_identifier),
                "seeded ATM identifier {:?} appears more than once",
                atm.atm_identifier
            );
            max_id = max_id.max(atm.id);
            repo.by_identifier.insert(atm.atm_identifier.clone(), atm.id);
            repo.rows.insert(atm.id, atm);
        }
        let next = max_id
            .checked_add(1)
            .with_context(|| format!("seeded ATM id {max_id} leaves no id for new records"))?;
        *repo.writes.lock() = next;
        Ok(repo)
    }
}

#[async_trait]
impl AtmRepository for InMemoryAtmRepository {
    async fn create(&self, mut atm: Atm) -> anyhow::Result<AtmWrite> {
        let mut next_id = self.writes.lock();
        if self.by_identifier.contains_key(&atm.atm_identifier) {
            return Ok(AtmWrite::DuplicateIdentifier);
        }
        atm.id = *next_id;
        *next_id = next_id.checked_add(1).context("ATM id space exhausted")?;
        self.by_identifier.insert(atm.atm_identifier.clone(), atm.id);
        self.rows.insert(atm.id, atm.clone());
        Ok(AtmWrite::Stored(atm))
    }

    async fn list(&self) -> anyhow::Result<Vec<Atm>> {
        let mut atms: Vec<Atm> = self.rows.iter().map(|e| e.value().clone()).collect();
        atms.sort_by_key(|a| a.id);
        Ok(atms)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Atm>> {
        Ok(self.rows.get(&id).map(|e| e.value().clone()))
    }

    async fn update(&self, atm: Atm) -> anyhow::Result<AtmWrite> {
        let _guard = self.writes.lock();
        let Some(previous) = self.rows.get(&atm.id).map(|e| e.atm_identifier.clone()) else {
            return Ok(AtmWrite::Missing);
        };
        if self
            .by_identifier
            .get(&atm.atm_identifier)
            .is_some_and(|owner| *owner != atm.id)
        {
            return Ok(AtmWrite::DuplicateIdentifier);
        }
        if previous != atm.atm_identifier {
            self.by_identifier.remove(&previous);
            self.by_identifier.insert(atm.atm_identifier.clone(), atm.id);
        }
        self.rows.insert(atm.id, atm.clone());
        Ok(AtmWrite::Stored(atm))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let _guard = self.writes.lock();
        let Some((_, atm)) = self.rows.remove(&id) else {
            return Ok(false);
        };
        self.by_identifier.remove(&atm.atm_identifier);
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAutomatedTellerMachineRepository {
    rows: DashMap<String, AutomatedTellerMachine>,
}

impl InMemoryAutomatedTellerMachineRepository {
    pub fn with_records(records: impl IntoIterator<Item = AutomatedTellerMachine>) -> Self {
        let rows = records
            .into_iter()
            .map(|r| (r.atm_identifier.clone(), r))
            .collect();
        Self { rows }
    }
}

#[async_trait]
impl AutomatedTellerMachineRepository for InMemoryAutomatedTellerMachineRepository {
    async fn list(&self) -> anyhow::Result<Vec<AutomatedTellerMachine>> {
        Ok(sorted(&self.rows))
    }

    async fn find(&self, atm_identifier: &str) -> anyhow::Result<Option<AutomatedTellerMachine>> {
        Ok(self.rows.get(atm_identifier).map(|e| e.value().clone()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPresentialChannelRepository {
    rows: DashMap<String, PresentialChannel>,
}

impl InMemoryPresentialChannelRepository {
    pub fn with_records(records: impl IntoIterator<Item = PresentialChannel>) -> Self {
        let rows = records
            .into_iter()
            .map(|r| (r.channel_identifier.clone(), r))
            .collect();
        Self { rows }
    }
}

#[async_trait]
impl PresentialChannelRepository for InMemoryPresentialChannelRepository {
    async fn list(&self) -> anyhow::Result<Vec<PresentialChannel>> {
        Ok(sorted(&self.rows))
    }

    async fn find(&self, channel_identifier: &str) -> anyhow::Result<Option<PresentialChannel>> {
        Ok(self.rows.get(channel_identifier).map(|e| e.value().clone()))
    }
}

/// Values ordered by key.
fn sorted<T: Clone>(rows: &DashMap<String, T>) -> Vec<T> {
    let mut entries: Vec<(String, T)> = rows
        .iter()
        .map(|e| (e.key().clone(), e.value().clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().map(|(_, v)| v).collect()
}
