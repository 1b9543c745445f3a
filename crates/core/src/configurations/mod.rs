//! Configuration registry - POS integration profiles per store.

mod configurations_model;
mod configurations_service;
mod configurations_traits;


// Re-export the public interface
pub use configurations_model::{NewPosConfiguration, PosConfiguration, PosConfigurationUpdate};
pub use configurations_service::ConfigurationService;
pub use configurations_traits::{ConfigurationRepositoryTrait, ConfigurationServiceTrait};
