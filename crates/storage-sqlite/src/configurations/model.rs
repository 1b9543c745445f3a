//! Database models for POS configurations.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use posbridge_core::configurations::{NewPosConfiguration, PosConfiguration};

use crate::utils::{parse_rfc3339, parse_rfc3339_opt};

/// Database model for a POS configuration row.
///
/// Updates write the full row, so `None` must land as NULL
/// (`treat_none_as_null`); callers carry existing values over for fields
/// they do not touch.
#[derive(
    Queryable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::pos_configurations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct ConfigurationDB {
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
    pub cached_token: Option<String>,
    pub token_expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ConfigurationDB> for PosConfiguration {
    fn from(db: ConfigurationDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            store_id: db.store_id,
            base_url: db.base_url,
            login: db.login,
            organization_id: db.organization_id,
            organization_name: db.organization_name,
            terminal_group_id: db.terminal_group_id,
            terminal_group_name: db.terminal_group_name,
            auto_sync: db.auto_sync,
            sync_interval_minutes: db.sync_interval_minutes,
            is_active: db.is_active,
            cached_token: db.cached_token,
            token_expires_at: parse_rfc3339_opt(
                db.token_expires_at.as_deref(),
                "token_expires_at",
            ),
            created_at: parse_rfc3339(&db.created_at, "created_at"),
            updated_at: parse_rfc3339(&db.updated_at, "updated_at"),
        }
    }
}

impl From<NewPosConfiguration> for ConfigurationDB {
    fn from(new: NewPosConfiguration) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: new
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: new.name,
            store_id: new.store_id,
            base_url: new.base_url,
            login: new.login,
            organization_id: new.organization_id,
            organization_name: new.organization_name,
            terminal_group_id: new.terminal_group_id,
            terminal_group_name: new.terminal_group_name,
            auto_sync: new.auto_sync,
            sync_interval_minutes: new.sync_interval_minutes,
            is_active: new.is_active,
            cached_token: None,
            token_expires_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
