//! Category mapping domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// Maps an external catalog group to a local category.
///
/// A mapping with `store_id = None` is global; a store-scoped row takes
/// precedence over the global one when both match a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMapping {
    pub id: String,
    pub external_group_id: String,
    pub external_group_name: Option<String>,
    pub local_category_id: String,
    pub store_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a new category mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategoryMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub external_group_id: String,
    pub external_group_name: Option<String>,
    pub local_category_id: String,
    pub store_id: Option<String>,
}

impl NewCategoryMapping {
    pub fn validate(&self) -> Result<()> {
        if self.external_group_id.trim().is_empty() {
            return Err(ValidationError::MissingField("externalGroupId".to_string()).into());
        }
        if self.local_category_id.trim().is_empty() {
            return Err(ValidationError::MissingField("localCategoryId".to_string()).into());
        }
        Ok(())
    }
}

/// Partial update for an existing mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMappingUpdate {
    pub external_group_name: Option<Option<String>>,
    pub local_category_id: Option<String>,
    pub store_id: Option<Option<String>>,
}

impl CategoryMappingUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(local_category_id) = &self.local_category_id {
            if local_category_id.trim().is_empty() {
                return Err(ValidationError::MissingField("localCategoryId".to_string()).into());
            }
        }
        Ok(())
    }
}
