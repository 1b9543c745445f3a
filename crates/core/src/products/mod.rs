//! Local sales catalog - the reconciliation target of menu sync.

mod products_model;
mod products_traits;

// Re-export the public interface
pub use products_model::{NewProduct, Product, ProductCatalogUpdate};
pub use products_traits::ProductRepositoryTrait;
