//! Repository traits for the outbound order queue and its sync records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::orders_model::{
    NewOrderQueueEntry, OrderQueueEntry, OrderSyncRecord, QueueEntryStatus,
};
use crate::errors::Result;

/// Persistence contract for the durable order queue.
///
/// Status transitions go exclusively through the `mark_*` methods so every
/// mutation lands in one writer transaction.
#[async_trait]
pub trait OrderQueueRepositoryTrait: Send + Sync {
    /// Persists a new entry with `status = pending`.
    async fn enqueue(&self, new_entry: NewOrderQueueEntry) -> Result<OrderQueueEntry>;

    /// Claims up to `limit` eligible pending entries.
    ///
    /// Selection is ordered by priority descending, then creation time
    /// ascending, restricted to entries whose `not_before` has passed. The
    /// flip to `processing` is a compare-and-set on `status = pending` inside
    /// the same transaction, so concurrent claimers receive disjoint entries.
    async fn claim_batch(&self, limit: i64) -> Result<Vec<OrderQueueEntry>>;

    /// Terminal success: `processing → completed`.
    async fn mark_completed(&self, entry_id: &str) -> Result<OrderQueueEntry>;

    /// Failed attempt with budget left: `processing → pending`, stores the
    /// new retry count, the error, and the earliest next-claim instant.
    async fn mark_retry(
        &self,
        entry_id: &str,
        retry_count: i32,
        error_message: &str,
        not_before: DateTime<Utc>,
    ) -> Result<OrderQueueEntry>;

    /// Terminal failure: `processing → failed` once the budget is exhausted.
    async fn mark_failed(
        &self,
        entry_id: &str,
        retry_count: i32,
        error_message: &str,
    ) -> Result<OrderQueueEntry>;

    /// Retrieves an entry by its ID.
    fn get_by_id(&self, entry_id: &str) -> Result<OrderQueueEntry>;

    /// Lists entries, newest first, optionally filtered by status.
    fn list(
        &self,
        status_filter: Option<QueueEntryStatus>,
        limit: i64,
    ) -> Result<Vec<OrderQueueEntry>>;

    /// Number of entries currently in the given status.
    fn count_by_status(&self, status: QueueEntryStatus) -> Result<i64>;
}

/// Persistence contract for per-order sync records.
///
/// One logical record per order id, upserted across attempts.
#[async_trait]
pub trait OrderSyncRecordRepositoryTrait: Send + Sync {
    /// Upserts the record to `syncing` and increments its attempt counter.
    async fn mark_attempt(&self, order_id: &str, order_number: &str) -> Result<OrderSyncRecord>;

    /// Upserts the record to `success` with the POS-side identifiers.
    async fn mark_success(
        &self,
        order_id: &str,
        external_order_id: &str,
        external_ticket_number: Option<&str>,
    ) -> Result<OrderSyncRecord>;

    /// Upserts the record to `failed` with the error details.
    async fn mark_failure(
        &self,
        order_id: &str,
        error_code: Option<&str>,
        error_message: &str,
    ) -> Result<OrderSyncRecord>;

    /// Retrieves the record for an order, if any.
    fn get_by_order_id(&self, order_id: &str) -> Result<Option<OrderSyncRecord>>;

    /// Idempotency probe: an existing `success` record for this order number,
    /// if any. The worker short-circuits instead of re-pushing.
    fn find_success_by_order_number(&self, order_number: &str) -> Result<Option<OrderSyncRecord>>;

    /// Most recently updated records, for admin visibility.
    fn list_recent(&self, limit: i64) -> Result<Vec<OrderSyncRecord>>;
}
