//! SQLite storage implementation for category mappings.

mod model;
mod repository;

pub use model::CategoryMappingDB;
pub use repository::CategoryMappingRepository;
