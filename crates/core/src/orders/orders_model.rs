//! Order queue domain models.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_QUEUE_PRIORITY, ORDER_PAYLOAD_VERSION, RETRY_BACKOFF_BASE_SECS,
    RETRY_BACKOFF_MAX_SECS,
};
use crate::errors::{Result, ValidationError};

/// Lifecycle of a queue entry.
///
/// `pending → processing → {completed | pending(retry) | failed}`;
/// `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueueEntryStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl QueueEntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueEntryStatus::Pending => "pending",
            QueueEntryStatus::Processing => "processing",
            QueueEntryStatus::Completed => "completed",
            QueueEntryStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueEntryStatus::Completed | QueueEntryStatus::Failed)
    }
}

impl FromStr for QueueEntryStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QueueEntryStatus::Pending),
            "processing" => Ok(QueueEntryStatus::Processing),
            "completed" => Ok(QueueEntryStatus::Completed),
            "failed" => Ok(QueueEntryStatus::Failed),
            _ => Err(format!("Unknown queue entry status: {}", s)),
        }
    }
}

/// Per-push sync outcome recorded for idempotency and admin visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderSyncStatus {
    #[default]
    Pending,
    Syncing,
    Success,
    Failed,
}

impl OrderSyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSyncStatus::Pending => "pending",
            OrderSyncStatus::Syncing => "syncing",
            OrderSyncStatus::Success => "success",
            OrderSyncStatus::Failed => "failed",
        }
    }
}

impl FromStr for OrderSyncStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderSyncStatus::Pending),
            "syncing" => Ok(OrderSyncStatus::Syncing),
            "success" => Ok(OrderSyncStatus::Success),
            "failed" => Ok(OrderSyncStatus::Failed),
            _ => Err(format!("Unknown order sync status: {}", s)),
        }
    }
}

/// One durable unit of outbound work.
///
/// Written once by the order-placement collaborator, then mutated only by the
/// queue worker. Never deleted: completed and failed rows stay as audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQueueEntry {
    pub id: String,
    pub order_id: String,
    pub order_number: String,
    pub store_id: Option<String>,
    /// Serialized [`OrderPayload`] (JSON).
    pub payload: String,
    pub status: QueueEntryStatus,
    pub priority: i32,
    pub retry_count: i32,
    pub max_retries: i32,
    /// Entry is not claimable before this instant (retry backoff).
    pub not_before: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl OrderQueueEntry {
    /// Deserializes and version-checks the order payload.
    pub fn parse_payload(&self) -> Result<OrderPayload> {
        let payload: OrderPayload = serde_json::from_str(&self.payload)
            .map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;
        if payload.schema_version != ORDER_PAYLOAD_VERSION {
            return Err(
                ValidationError::UnsupportedPayloadVersion(payload.schema_version).into(),
            );
        }
        Ok(payload)
    }
}

/// Input model for enqueueing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderQueueEntry {
    pub order_id: String,
    pub order_number: String,
    pub store_id: Option<String>,
    pub payload: OrderPayload,
    /// Higher priority drains first; admin tooling may raise this.
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
}

fn default_priority() -> i32 {
    DEFAULT_QUEUE_PRIORITY
}

fn default_max_retries() -> i32 {
    DEFAULT_MAX_RETRIES
}

impl NewOrderQueueEntry {
    pub fn validate(&self) -> Result<()> {
        if self.order_id.trim().is_empty() {
            return Err(ValidationError::MissingField("orderId".to_string()).into());
        }
        if self.order_number.trim().is_empty() {
            return Err(ValidationError::MissingField("orderNumber".to_string()).into());
        }
        if self.max_retries < 1 {
            return Err(ValidationError::InvalidInput(format!(
                "maxRetries must be at least 1, got {}",
                self.max_retries
            ))
            .into());
        }
        if self.payload.items.is_empty() {
            return Err(ValidationError::InvalidInput(
                "order payload has no line items".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Explicit, versioned order shape shared with the order-placement
/// collaborator. Serialized into the queue entry; the worker refuses
/// versions it does not understand instead of guessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub schema_version: u32,
    pub order_id: String,
    pub order_number: String,
    pub store_id: Option<String>,
    pub customer: Option<OrderCustomer>,
    pub items: Vec<OrderLine>,
    pub comment: Option<String>,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product id in the POS catalog.
    pub external_product_id: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// One logical sync record per order, updated across push attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSyncRecord {
    pub order_id: String,
    pub order_number: String,
    pub external_order_id: Option<String>,
    pub external_ticket_number: Option<String>,
    pub sync_status: OrderSyncStatus,
    pub attempts: i32,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of one queue drain pass.
///
/// `claimed = completed + retried + failed + errors`; `errors` counts
/// entries whose bookkeeping failed mid-flight (they stay in `processing`
/// until an operator intervenes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSyncRunSummary {
    pub claimed: u32,
    pub completed: u32,
    pub retried: u32,
    pub failed: u32,
    pub errors: u32,
}

/// Exponential backoff before retry `n` (1-based): 5s, 10s, 20s, ...,
/// capped at 300s. A failing POS endpoint is revisited, not hammered.
pub fn retry_backoff(retry_count: i32) -> Duration {
    let exponent = retry_count.saturating_sub(1).clamp(0, 30) as u32;
    let secs = RETRY_BACKOFF_BASE_SECS
        .saturating_mul(1i64 << exponent)
        .min(RETRY_BACKOFF_MAX_SECS);
    Duration::seconds(secs)
}
