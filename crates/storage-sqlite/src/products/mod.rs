//! SQLite storage implementation for the local sales catalog.

mod model;
mod repository;

pub use model::ProductDB;
pub use repository::ProductRepository;
