//! Inbound menu sync - per-product records and run summaries.

mod menu_model;
mod menu_traits;


// Re-export the public interface
pub use menu_model::{
    MenuSyncOutcome, MenuSyncRecord, MenuSyncRecordUpsert, MenuSyncStatus, MenuSyncSummary,
};
pub use menu_traits::MenuSyncRecordRepositoryTrait;
