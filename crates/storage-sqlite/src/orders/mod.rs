//! SQLite storage implementation for the order queue and its sync records.

mod model;
mod repository;

pub use model::{OrderQueueEntryDB, OrderSyncRecordDB};
pub use repository::{OrderQueueRepository, OrderSyncRecordRepository};
