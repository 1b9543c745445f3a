use std::sync::Arc;

use super::mappings_model::{CategoryMapping, CategoryMappingUpdate, NewCategoryMapping};
use super::mappings_traits::{CategoryMappingRepositoryTrait, CategoryMappingServiceTrait};
use crate::errors::Result;

/// Service for managing category mappings.
pub struct CategoryMappingService {
    repository: Arc<dyn CategoryMappingRepositoryTrait>,
}

impl CategoryMappingService {
    pub fn new(repository: Arc<dyn CategoryMappingRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl CategoryMappingServiceTrait for CategoryMappingService {
    async fn create_mapping(&self, new_mapping: NewCategoryMapping) -> Result<CategoryMapping> {
        new_mapping.validate()?;
        self.repository.create(new_mapping).await
    }

    async fn update_mapping(
        &self,
        mapping_id: &str,
        update: CategoryMappingUpdate,
    ) -> Result<CategoryMapping> {
        update.validate()?;
        self.repository.update(mapping_id, update).await
    }

    async fn delete_mapping(&self, mapping_id: &str) -> Result<()> {
        self.repository.delete(mapping_id).await?;
        Ok(())
    }

    fn get_mapping(&self, mapping_id: &str) -> Result<CategoryMapping> {
        self.repository.get_by_id(mapping_id)
    }

    fn list_mappings(&self, store_id: Option<&str>) -> Result<Vec<CategoryMapping>> {
        self.repository.list(store_id)
    }

    fn resolve_category(
        &self,
        external_group_id: &str,
        store_id: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(self
            .repository
            .find_for_group(external_group_id, store_id)?
            .map(|mapping| mapping.local_category_id))
    }
}
