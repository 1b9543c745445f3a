//! Category mappings - route external catalog groups to local categories.

mod mappings_model;
mod mappings_service;
mod mappings_traits;


// Re-export the public interface
pub use mappings_model::{CategoryMapping, CategoryMappingUpdate, NewCategoryMapping};
pub use mappings_service::CategoryMappingService;
pub use mappings_traits::{CategoryMappingRepositoryTrait, CategoryMappingServiceTrait};
