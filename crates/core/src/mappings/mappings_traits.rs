//! Category mapping repository and service traits.

use async_trait::async_trait;

use super::mappings_model::{CategoryMapping, CategoryMappingUpdate, NewCategoryMapping};
use crate::errors::Result;

/// Trait defining the contract for category mapping persistence.
#[async_trait]
pub trait CategoryMappingRepositoryTrait: Send + Sync {
    /// Creates a new mapping.
    async fn create(&self, new_mapping: NewCategoryMapping) -> Result<CategoryMapping>;

    /// Applies a partial update to an existing mapping.
    async fn update(
        &self,
        mapping_id: &str,
        update: CategoryMappingUpdate,
    ) -> Result<CategoryMapping>;

    /// Deletes a mapping by ID; returns the number of deleted records.
    async fn delete(&self, mapping_id: &str) -> Result<usize>;

    /// Retrieves a mapping by its ID.
    fn get_by_id(&self, mapping_id: &str) -> Result<CategoryMapping>;

    /// Lists mappings, optionally restricted to one store's scope.
    fn list(&self, store_id: Option<&str>) -> Result<Vec<CategoryMapping>>;

    /// Resolves the mapping for an external group: the store-scoped row when
    /// one exists, otherwise the global row (`store_id` NULL), otherwise None.
    fn find_for_group(
        &self,
        external_group_id: &str,
        store_id: Option<&str>,
    ) -> Result<Option<CategoryMapping>>;
}

/// Trait defining the contract for category mapping service operations.
#[async_trait]
pub trait CategoryMappingServiceTrait: Send + Sync {
    async fn create_mapping(&self, new_mapping: NewCategoryMapping) -> Result<CategoryMapping>;

    async fn update_mapping(
        &self,
        mapping_id: &str,
        update: CategoryMappingUpdate,
    ) -> Result<CategoryMapping>;

    async fn delete_mapping(&self, mapping_id: &str) -> Result<()>;

    fn get_mapping(&self, mapping_id: &str) -> Result<CategoryMapping>;

    fn list_mappings(&self, store_id: Option<&str>) -> Result<Vec<CategoryMapping>>;

    /// Returns the local category id for an external group, or None when the
    /// group is unmapped (menu sync quarantines the product in that case).
    fn resolve_category(
        &self,
        external_group_id: &str,
        store_id: Option<&str>,
    ) -> Result<Option<String>>;
}
