//! Database models for the order queue and order sync records.

use std::str::FromStr;

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use posbridge_core::errors::Result;
use posbridge_core::orders::{
    NewOrderQueueEntry, OrderQueueEntry, OrderSyncRecord, OrderSyncStatus, QueueEntryStatus,
};

use crate::utils::{parse_rfc3339, parse_rfc3339_opt};

#[derive(
    Queryable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::order_queue)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderQueueEntryDB {
    pub id: String,
    pub order_id: String,
    pub order_number: String,
    pub store_id: Option<String>,
    pub payload: String,
    pub status: String,
    pub priority: i32,
    pub retry_count: i32,
    pub max_retries: i32,
    pub not_before: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub processed_at: Option<String>,
    pub completed_at: Option<String>,
}

impl OrderQueueEntryDB {
    /// Builds a fresh pending row from the enqueue input. Serializes the
    /// payload, which is the only step that can fail.
    pub fn from_new(new: NewOrderQueueEntry) -> Result<Self> {
        let payload = serde_json::to_string(&new.payload)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: new.order_id,
            order_number: new.order_number,
            store_id: new.store_id,
            payload,
            status: QueueEntryStatus::Pending.as_str().to_string(),
            priority: new.priority,
            retry_count: 0,
            max_retries: new.max_retries,
            not_before: None,
            error_message: None,
            created_at: Utc::now().to_rfc3339(),
            processed_at: None,
            completed_at: None,
        })
    }
}

impl From<OrderQueueEntryDB> for OrderQueueEntry {
    fn from(db: OrderQueueEntryDB) -> Self {
        Self {
            id: db.id,
            order_id: db.order_id,
            order_number: db.order_number,
            store_id: db.store_id,
            payload: db.payload,
            status: QueueEntryStatus::from_str(&db.status).unwrap_or_else(|e| {
                log::error!("{}", e);
                QueueEntryStatus::Pending
            }),
            priority: db.priority,
            retry_count: db.retry_count,
            max_retries: db.max_retries,
            not_before: parse_rfc3339_opt(db.not_before.as_deref(), "not_before"),
            error_message: db.error_message,
            created_at: parse_rfc3339(&db.created_at, "created_at"),
            processed_at: parse_rfc3339_opt(db.processed_at.as_deref(), "processed_at"),
            completed_at: parse_rfc3339_opt(db.completed_at.as_deref(), "completed_at"),
        }
    }
}

#[derive(
    Queryable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::order_sync_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(order_id))]
pub struct OrderSyncRecordDB {
    pub order_id: String,
    pub order_number: String,
    pub external_order_id: Option<String>,
    pub external_ticket_number: Option<String>,
    pub sync_status: String,
    pub attempts: i32,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub last_synced_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderSyncRecordDB> for OrderSyncRecord {
    fn from(db: OrderSyncRecordDB) -> Self {
        Self {
            order_id: db.order_id,
            order_number: db.order_number,
            external_order_id: db.external_order_id,
            external_ticket_number: db.external_ticket_number,
            sync_status: OrderSyncStatus::from_str(&db.sync_status).unwrap_or_else(|e| {
                log::error!("{}", e);
                OrderSyncStatus::Pending
            }),
            attempts: db.attempts,
            error_code: db.error_code,
            error_message: db.error_message,
            last_synced_at: parse_rfc3339_opt(db.last_synced_at.as_deref(), "last_synced_at"),
            created_at: parse_rfc3339(&db.created_at, "created_at"),
            updated_at: parse_rfc3339(&db.updated_at, "updated_at"),
        }
    }
}
