//! Outbound order sync - queue entries, sync records, and payload shapes.

mod orders_model;
mod orders_traits;

#[cfg(test)]
mod orders_model_tests;

// Re-export the public interface
pub use orders_model::{
    retry_backoff, NewOrderQueueEntry, OrderCustomer, OrderLine, OrderPayload, OrderQueueEntry,
    OrderSyncRecord, OrderSyncRunSummary, OrderSyncStatus, QueueEntryStatus,
};
pub use orders_traits::{OrderQueueRepositoryTrait, OrderSyncRecordRepositoryTrait};
