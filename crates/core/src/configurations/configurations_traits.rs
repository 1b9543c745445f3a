//! Configuration repository and service traits.
//!
//! These traits define the contract for configuration operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::configurations_model::{NewPosConfiguration, PosConfiguration, PosConfigurationUpdate};
use crate::errors::Result;

/// Trait defining the contract for configuration repository operations.
#[async_trait]
pub trait ConfigurationRepositoryTrait: Send + Sync {
    /// Creates a new configuration.
    async fn create(&self, new_config: NewPosConfiguration) -> Result<PosConfiguration>;

    /// Applies a partial update to an existing configuration.
    async fn update(
        &self,
        config_id: &str,
        update: PosConfigurationUpdate,
    ) -> Result<PosConfiguration>;

    /// Deletes a configuration by its ID.
    ///
    /// Returns the number of deleted records. Historical queue and sync
    /// records are not touched; they reference configurations by id only.
    async fn delete(&self, config_id: &str) -> Result<usize>;

    /// Retrieves a configuration by its ID.
    fn get_by_id(&self, config_id: &str) -> Result<PosConfiguration>;

    /// Resolves the effective configuration for a store: the most recently
    /// updated row with `is_active = true` and a matching store id.
    fn get_active_by_store(&self, store_id: &str) -> Result<Option<PosConfiguration>>;

    /// Lists configurations, optionally filtered by active status.
    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<PosConfiguration>>;

    /// Persists a refreshed bearer token onto the configuration row.
    async fn store_token(
        &self,
        config_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Drops the cached token, forcing the next caller through a refresh.
    async fn clear_token(&self, config_id: &str) -> Result<()>;
}

/// Trait defining the contract for configuration service operations.
#[async_trait]
pub trait ConfigurationServiceTrait: Send + Sync {
    /// Creates a new configuration after validating it.
    async fn create_configuration(&self, new_config: NewPosConfiguration)
        -> Result<PosConfiguration>;

    /// Applies a validated partial update.
    async fn update_configuration(
        &self,
        config_id: &str,
        update: PosConfigurationUpdate,
    ) -> Result<PosConfiguration>;

    /// Deletes a configuration. Queue entries and sync records survive.
    async fn delete_configuration(&self, config_id: &str) -> Result<()>;

    /// Retrieves a configuration by ID.
    fn get_configuration(&self, config_id: &str) -> Result<PosConfiguration>;

    /// Resolves the effective active configuration for a store.
    fn get_active_for_store(&self, store_id: &str) -> Result<Option<PosConfiguration>>;

    /// Lists all configurations.
    fn list_configurations(&self) -> Result<Vec<PosConfiguration>>;

    /// Lists only active configurations (menu sync iterates these).
    fn list_active_configurations(&self) -> Result<Vec<PosConfiguration>>;
}
