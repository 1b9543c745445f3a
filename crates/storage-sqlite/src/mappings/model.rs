//! Database models for category mappings.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use posbridge_core::mappings::{CategoryMapping, NewCategoryMapping};

use crate::utils::parse_rfc3339;

#[derive(
    Queryable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::category_mappings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct CategoryMappingDB {
    pub id: String,
    pub external_group_id: String,
    pub external_group_name: Option<String>,
    pub local_category_id: String,
    pub store_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CategoryMappingDB> for CategoryMapping {
    fn from(db: CategoryMappingDB) -> Self {
        Self {
            id: db.id,
            external_group_id: db.external_group_id,
            external_group_name: db.external_group_name,
            local_category_id: db.local_category_id,
            store_id: db.store_id,
            created_at: parse_rfc3339(&db.created_at, "created_at"),
            updated_at: parse_rfc3339(&db.updated_at, "updated_at"),
        }
    }
}

impl From<NewCategoryMapping> for CategoryMappingDB {
    fn from(new: NewCategoryMapping) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: new
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            external_group_id: new.external_group_id,
            external_group_name: new.external_group_name,
            local_category_id: new.local_category_id,
            store_id: new.store_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
