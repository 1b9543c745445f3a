use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use posbridge_core::configurations as core_configurations;

/// Admin-facing view of a POS configuration.
///
/// The cached bearer token never leaves the server; only its presence and
/// expiry are reported.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationView {
    pub id: String,
    pub name: String,
    pub store_id: Option<String>,
    pub base_url: String,
    pub login: String,
    pub organization_id: String,
    pub organization_name: Option<String>,
    pub terminal_group_id: Option<String>,
    pub terminal_group_name: Option<String>,
    pub auto_sync: bool,
    pub sync_interval_minutes: i32,
    pub is_active: bool,
    pub has_token: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<core_configurations::PosConfiguration> for ConfigurationView {
    fn from(c: core_configurations::PosConfiguration) -> Self {
        Self {
            has_token: c.cached_token.is_some(),
            id: c.id,
            name: c.name,
            store_id: c.store_id,
            base_url: c.base_url,
            login: c.login,
            organization_id: c.organization_id,
            organization_name: c.organization_name,
            terminal_group_id: c.terminal_group_id,
            terminal_group_name: c.terminal_group_name,
            auto_sync: c.auto_sync,
            sync_interval_minutes: c.sync_interval_minutes,
            is_active: c.is_active,
            token_expires_at: c.token_expires_at,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
