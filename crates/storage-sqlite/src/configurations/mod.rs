//! SQLite storage implementation for POS configurations.

mod model;
mod repository;

pub use model::ConfigurationDB;
pub use repository::ConfigurationRepository;
