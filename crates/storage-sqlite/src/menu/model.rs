//! Database models for menu sync records.

use std::str::FromStr;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use posbridge_core::menu::{MenuSyncRecord, MenuSyncRecordUpsert, MenuSyncStatus};

use crate::utils::{parse_decimal, parse_rfc3339};

/// Database model for one (configuration, external product) sync record.
///
/// The same table carries the per-run sentinel row, distinguished by its
/// reserved external product id.
#[derive(
    Queryable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::menu_sync_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(config_id, external_product_id))]
#[diesel(treat_none_as_null = true)]
pub struct MenuSyncRecordDB {
    pub config_id: String,
    pub external_product_id: String,
    pub external_product_name: Option<String>,
    pub external_group_id: Option<String>,
    pub external_group_name: Option<String>,
    pub local_product_id: Option<String>,
    pub snapshot: Option<String>,
    pub price: Option<String>,
    pub is_available: bool,
    pub is_in_stop_list: bool,
    pub sync_status: String,
    pub last_synced_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl MenuSyncRecordDB {
    /// Builds the full row for an upsert; `created_at` is carried over from
    /// the previous row when one exists.
    pub fn from_upsert(upsert: MenuSyncRecordUpsert, created_at: String, now: String) -> Self {
        Self {
            config_id: upsert.config_id,
            external_product_id: upsert.external_product_id,
            external_product_name: upsert.external_product_name,
            external_group_id: upsert.external_group_id,
            external_group_name: upsert.external_group_name,
            local_product_id: upsert.local_product_id,
            snapshot: upsert.snapshot,
            price: upsert.price.map(|p| p.to_string()),
            is_available: upsert.is_available,
            is_in_stop_list: upsert.is_in_stop_list,
            sync_status: upsert.sync_status.as_str().to_string(),
            last_synced_at: now.clone(),
            created_at,
            updated_at: now,
        }
    }
}

impl From<MenuSyncRecordDB> for MenuSyncRecord {
    fn from(db: MenuSyncRecordDB) -> Self {
        Self {
            config_id: db.config_id,
            external_product_id: db.external_product_id,
            external_product_name: db.external_product_name,
            external_group_id: db.external_group_id,
            external_group_name: db.external_group_name,
            local_product_id: db.local_product_id,
            snapshot: db.snapshot,
            price: db.price.as_deref().map(|p| parse_decimal(p, "price")),
            is_available: db.is_available,
            is_in_stop_list: db.is_in_stop_list,
            sync_status: MenuSyncStatus::from_str(&db.sync_status).unwrap_or_else(|e| {
                log::error!("{}", e);
                MenuSyncStatus::Error
            }),
            last_synced_at: parse_rfc3339(&db.last_synced_at, "last_synced_at"),
        }
    }
}
