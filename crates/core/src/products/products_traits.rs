//! Product repository trait.

use async_trait::async_trait;

use super::products_model::{NewProduct, Product, ProductCatalogUpdate};
use crate::errors::Result;

/// Persistence contract for the local sales catalog.
#[async_trait]
pub trait ProductRepositoryTrait: Send + Sync {
    /// Creates a new product.
    async fn create(&self, new_product: NewProduct) -> Result<Product>;

    /// Applies a catalog-driven update (name, description, price,
    /// availability) and touches `updated_at`.
    async fn apply_catalog_update(
        &self,
        product_id: &str,
        update: ProductCatalogUpdate,
    ) -> Result<Product>;

    /// Finds a product by its POS external id within a store scope.
    fn get_by_external_id(
        &self,
        external_id: &str,
        store_id: Option<&str>,
    ) -> Result<Option<Product>>;

    /// Lists products, optionally restricted to one store.
    fn list(&self, store_id: Option<&str>) -> Result<Vec<Product>>;
}
