use log::debug;
use std::sync::Arc;

use super::configurations_model::{
    NewPosConfiguration, PosConfiguration, PosConfigurationUpdate,
};
use super::configurations_traits::{ConfigurationRepositoryTrait, ConfigurationServiceTrait};
use crate::errors::Result;

/// Service for managing POS configurations.
///
/// Pure registry: validates and persists profiles, never contacts the POS.
pub struct ConfigurationService {
    repository: Arc<dyn ConfigurationRepositoryTrait>,
}

impl ConfigurationService {
    pub fn new(repository: Arc<dyn ConfigurationRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl ConfigurationServiceTrait for ConfigurationService {
    async fn create_configuration(
        &self,
        new_config: NewPosConfiguration,
    ) -> Result<PosConfiguration> {
        new_config.validate()?;
        debug!(
            "Creating POS configuration '{}' (store: {:?})",
            new_config.name, new_config.store_id
        );
        self.repository.create(new_config).await
    }

    async fn update_configuration(
        &self,
        config_id: &str,
        update: PosConfigurationUpdate,
    ) -> Result<PosConfiguration> {
        update.validate()?;
        // New credentials make any cached token meaningless.
        if update.changes_credentials() {
            self.repository.clear_token(config_id).await?;
        }
        self.repository.update(config_id, update).await
    }

    async fn delete_configuration(&self, config_id: &str) -> Result<()> {
        self.repository.delete(config_id).await?;
        Ok(())
    }

    fn get_configuration(&self, config_id: &str) -> Result<PosConfiguration> {
        self.repository.get_by_id(config_id)
    }

    fn get_active_for_store(&self, store_id: &str) -> Result<Option<PosConfiguration>> {
        self.repository.get_active_by_store(store_id)
    }

    fn list_configurations(&self) -> Result<Vec<PosConfiguration>> {
        self.repository.list(None)
    }

    fn list_active_configurations(&self) -> Result<Vec<PosConfiguration>> {
        self.repository.list(Some(true))
    }
}
