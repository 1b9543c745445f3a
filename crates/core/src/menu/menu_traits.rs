//! Menu sync record repository trait.

use async_trait::async_trait;

use super::menu_model::{MenuSyncRecord, MenuSyncRecordUpsert, MenuSyncStatus};
use crate::errors::Result;

/// Persistence contract for menu sync records.
#[async_trait]
pub trait MenuSyncRecordRepositoryTrait: Send + Sync {
    /// Inserts or updates the record for (config_id, external_product_id).
    async fn upsert(&self, record: MenuSyncRecordUpsert) -> Result<MenuSyncRecord>;

    /// Retrieves one record, if present.
    fn get(&self, config_id: &str, external_product_id: &str)
        -> Result<Option<MenuSyncRecord>>;

    /// Lists a configuration's records, optionally filtered by status
    /// (e.g. the quarantine list for operator review). Excludes the
    /// sentinel row unless the filter asks for a marker status.
    fn list_for_config(
        &self,
        config_id: &str,
        status_filter: Option<MenuSyncStatus>,
    ) -> Result<Vec<MenuSyncRecord>>;

    /// The configuration's sentinel run marker, if a run has happened.
    fn last_run_marker(&self, config_id: &str) -> Result<Option<MenuSyncRecord>>;
}
