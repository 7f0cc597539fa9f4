use std::sync::Arc;

use super::error::DomainError;
use super::models::{Atm, AutomatedTellerMachine, PresentialChannel};
use super::repo::{
    AtmRepository, AtmWrite, AutomatedTellerMachineRepository, PresentialChannelRepository,
};

pub const ATM_NOT_FOUND: &str = "ATM not found";
pub const PRESENTIAL_CHANNEL_NOT_FOUND: &str = "Presential Channel not found";

/// Channel catalogue operations behind the REST handlers.
pub struct Service {
    atms: Arc<dyn AtmRepository>,
    teller_machines: Arc<dyn AutomatedTellerMachineRepository>,
    presential_channels: Arc<dyn PresentialChannelRepository>,
}

impl Service {
    pub fn new(
        atms: Arc<dyn AtmRepository>,
        teller_machines: Arc<dyn AutomatedTellerMachineRepository>,
        presential_channels: Arc<dyn PresentialChannelRepository>,
    ) -> Self {
        Self {
            atms,
            teller_machines,
            presential_channels,
        }
    }

    pub async fn create_atm(&self, atm: Atm) -> Result<Atm, DomainError> {
        validate_atm(&atm)?;
        let identifier = atm.atm_identifier.clone();
        let created = stored(self.atms.create(atm).await?, &identifier)?;
        tracing::info!(id = created.id, atm_identifier = %created.atm_identifier, "ATM created");
        Ok(created)
    }

    pub async fn list_atms(&self) -> Result<Vec<Atm>, DomainError> {
        Ok(self.atms.list().await?)
    }

    pub async fn get_atm(&self, id: i64) -> Result<Atm, DomainError> {
        self.atms
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound(ATM_NOT_FOUND))
    }

    /// Replace the ATM stored under `id` with `atm`.
    pub async fn update_atm(&self, id: i64, mut atm: Atm) -> Result<Atm, DomainError> {
        validate_atm(&atm)?;
        atm.id = id;
        let identifier = atm.atm_identifier.clone();
        stored(self.atms.update(atm).await?, &identifier)
    }

    pub async fn delete_atm(&self, id: i64) -> Result<(), DomainError> {
        if self.atms.delete(id).await? {
            tracing::info!(id, "ATM deleted");
            Ok(())
        } else {
            Err(DomainError::NotFound(ATM_NOT_FOUND))
        }
    }

    pub async fn list_automated_teller_machines(
        &self,
    ) -> Result<Vec<AutomatedTellerMachine>, DomainError> {
        Ok(self.teller_machines.list().await?)
    }

    pub async fn get_automated_teller_machine(
        &self,
        atm_identifier: &str,
    ) -> Result<AutomatedTellerMachine, DomainError> {
        self.teller_machines
            .find(atm_identifier)
            .await?
            .ok_or(DomainError::NotFound(ATM_NOT_FOUND))
    }

    pub async fn list_presential_channels(&self) -> Result<Vec<PresentialChannel>, DomainError> {
        Ok(self.presential_channels.list().await?)
    }

    pub async fn get_presential_channel(
        &self,
        channel_identifier: &str,
    ) -> Result<PresentialChannel, DomainError> {
        self.presential_channels
            .find(channel_identifier)
            .await?
            .ok_or(DomainError::NotFound(PRESENTIAL_CHANNEL_NOT_FOUND))
    }
}

fn stored(write: AtmWrite, identifier: &str) -> Result<Atm, DomainError> {
    match write {
        AtmWrite::Stored(atm) => Ok(atm),
        AtmWrite::DuplicateIdentifier => Err(DomainError::Conflict(format!(
            "ATM with identifier {identifier} already exists"
        ))),
        AtmWrite::Missing => Err(DomainError::NotFound(ATM_NOT_FOUND)),
    }
}

fn validate_atm(atm: &Atm) -> Result<(), DomainError> {
    if atm.atm_identifier.trim().is_empty() {
        return Err(DomainError::validation("atmidentifier", "is required"));
    }
    if !atm.from_datetime.is_zero()
        && !atm.to_datetime.is_zero()
        && atm.to_datetime < atm.from_datetime
    {
        return Err(DomainError::validation(
            "atmtodatetime",
            "must not be earlier than atmfromdatetime",
        ));
    }
    Ok(())
}
