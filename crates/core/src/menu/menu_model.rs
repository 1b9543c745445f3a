//! Menu sync record domain models.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MENU_SYNC_RUN_MARKER;

/// Outcome recorded for one (configuration, external product) pair, plus the
/// two marker statuses used by the per-run sentinel row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuSyncStatus {
    /// Product reconciled into the local catalog.
    Synced,
    /// No category mapping for the product's group; parked for review.
    Quarantined,
    /// Per-product processing error.
    Error,
    /// Sentinel row: the run completed.
    RunSuccess,
    /// Sentinel row: the run failed before processing any product.
    RunFailed,
}

impl MenuSyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuSyncStatus::Synced => "synced",
            MenuSyncStatus::Quarantined => "quarantined",
            MenuSyncStatus::Error => "error",
            MenuSyncStatus::RunSuccess => "run_success",
            MenuSyncStatus::RunFailed => "run_failed",
        }
    }
}

impl FromStr for MenuSyncStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "synced" => Ok(MenuSyncStatus::Synced),
            "quarantined" => Ok(MenuSyncStatus::Quarantined),
            "error" => Ok(MenuSyncStatus::Error),
            "run_success" => Ok(MenuSyncStatus::RunSuccess),
            "run_failed" => Ok(MenuSyncStatus::RunFailed),
            _ => Err(format!("Unknown menu sync status: {}", s)),
        }
    }
}

/// State of one external product under one configuration.
///
/// Keyed by (config_id, external_product_id); upserted, never duplicated.
/// The row with `external_product_id = "__menu_sync_run__"` is the sentinel
/// summarizing the configuration's last run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSyncRecord {
    pub config_id: String,
    pub external_product_id: String,
    pub external_product_name: Option<String>,
    pub external_group_id: Option<String>,
    pub external_group_name: Option<String>,
    pub local_product_id: Option<String>,
    /// Serialized POS product snapshot (JSON); run counts for the sentinel.
    pub snapshot: Option<String>,
    pub price: Option<Decimal>,
    pub is_available: bool,
    pub is_in_stop_list: bool,
    pub sync_status: MenuSyncStatus,
    pub last_synced_at: DateTime<Utc>,
}

impl MenuSyncRecord {
    pub fn is_run_marker(&self) -> bool {
        self.external_product_id == MENU_SYNC_RUN_MARKER
    }
}

/// Upsert input for a menu sync record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSyncRecordUpsert {
    pub config_id: String,
    pub external_product_id: String,
    pub external_product_name: Option<String>,
    pub external_group_id: Option<String>,
    pub external_group_name: Option<String>,
    pub local_product_id: Option<String>,
    pub snapshot: Option<String>,
    pub price: Option<Decimal>,
    pub is_available: bool,
    pub is_in_stop_list: bool,
    pub sync_status: MenuSyncStatus,
}

impl MenuSyncRecordUpsert {
    /// Sentinel row for a completed run: revision and counts in the snapshot.
    pub fn run_marker(config_id: &str, revision: i64, outcome: &MenuSyncOutcome) -> Self {
        let snapshot = serde_json::json!({
            "revision": revision,
            "created": outcome.created,
            "updated": outcome.updated,
            "quarantined": outcome.quarantined,
            "errors": outcome.errors,
        });
        Self {
            config_id: config_id.to_string(),
            external_product_id: MENU_SYNC_RUN_MARKER.to_string(),
            external_product_name: None,
            external_group_id: None,
            external_group_name: None,
            local_product_id: None,
            snapshot: Some(snapshot.to_string()),
            price: None,
            is_available: false,
            is_in_stop_list: false,
            sync_status: MenuSyncStatus::RunSuccess,
        }
    }

    /// Sentinel row for a run that failed before any product was processed.
    pub fn run_error_marker(config_id: &str, error: &str) -> Self {
        let snapshot = serde_json::json!({ "error": error });
        Self {
            config_id: config_id.to_string(),
            external_product_id: MENU_SYNC_RUN_MARKER.to_string(),
            external_product_name: None,
            external_group_id: None,
            external_group_name: None,
            local_product_id: None,
            snapshot: Some(snapshot.to_string()),
            price: None,
            is_available: false,
            is_in_stop_list: false,
            sync_status: MenuSyncStatus::RunFailed,
        }
    }
}

/// Per-configuration result of one menu sync run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSyncOutcome {
    pub config_id: String,
    pub config_name: String,
    pub success: bool,
    pub revision: Option<i64>,
    pub created: u32,
    pub updated: u32,
    pub quarantined: u32,
    pub errors: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Aggregate over one `sync_all_menus` pass.
///
/// `total` counts the active configurations considered; skipped rows
/// (auto-sync off, or synced more recently than their own interval) are
/// tracked separately and appear in neither `succeeded` nor `failed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSyncSummary {
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub skipped: u32,
    pub results: Vec<MenuSyncOutcome>,
}
