//! SQLite storage implementation for menu sync records.

mod model;
mod repository;

pub use model::MenuSyncRecordDB;
pub use repository::MenuSyncRecordRepository;
