//! Repository for category mapping persistence.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use posbridge_core::errors::Result;
use posbridge_core::mappings::{
    CategoryMapping, CategoryMappingRepositoryTrait, CategoryMappingUpdate, NewCategoryMapping,
};

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::category_mappings;

use super::model::CategoryMappingDB;

pub struct CategoryMappingRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CategoryMappingRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CategoryMappingRepositoryTrait for CategoryMappingRepository {
    async fn create(&self, new_mapping: NewCategoryMapping) -> Result<CategoryMapping> {
        new_mapping.validate()?;

        self.writer
            .exec(move |conn| {
                let db_mapping: CategoryMappingDB = new_mapping.into();

                diesel::insert_into(category_mappings::table)
                    .values(&db_mapping)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(db_mapping.into())
            })
            .await
    }

    async fn update(
        &self,
        mapping_id: &str,
        update: CategoryMappingUpdate,
    ) -> Result<CategoryMapping> {
        update.validate()?;
        let mapping_id = mapping_id.to_string();

        self.writer
            .exec(move |conn| {
                let mut db_mapping = category_mappings::table
                    .find(&mapping_id)
                    .first::<CategoryMappingDB>(conn)
                    .map_err(StorageError::from)?;

                if let Some(external_group_name) = update.external_group_name {
                    db_mapping.external_group_name = external_group_name;
                }
                if let Some(local_category_id) = update.local_category_id {
                    db_mapping.local_category_id = local_category_id;
                }
                if let Some(store_id) = update.store_id {
                    db_mapping.store_id = store_id;
                }
                db_mapping.updated_at = Utc::now().to_rfc3339();

                diesel::update(category_mappings::table.find(&db_mapping.id))
                    .set(&db_mapping)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(db_mapping.into())
            })
            .await
    }

    async fn delete(&self, mapping_id: &str) -> Result<usize> {
        let mapping_id = mapping_id.to_string();

        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(category_mappings::table.find(&mapping_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }

    fn get_by_id(&self, mapping_id: &str) -> Result<CategoryMapping> {
        let mut conn = get_connection(&self.pool)?;

        let db_mapping = category_mappings::table
            .find(mapping_id)
            .first::<CategoryMappingDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(db_mapping.into())
    }

    fn list(&self, store_id: Option<&str>) -> Result<Vec<CategoryMapping>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = category_mappings::table.into_boxed();

        if let Some(store) = store_id {
            // A store's scope includes the global rows it falls back to.
            query = query.filter(
                category_mappings::store_id
                    .eq(store)
                    .or(category_mappings::store_id.is_null()),
            );
        }

        let results = query
            .order(category_mappings::external_group_id.asc())
            .load::<CategoryMappingDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    fn find_for_group(
        &self,
        external_group_id: &str,
        store_id: Option<&str>,
    ) -> Result<Option<CategoryMapping>> {
        let mut conn = get_connection(&self.pool)?;

        // Store-scoped row first, then the global fallback.
        if let Some(store) = store_id {
            let scoped = category_mappings::table
                .filter(category_mappings::external_group_id.eq(external_group_id))
                .filter(category_mappings::store_id.eq(store))
                .first::<CategoryMappingDB>(&mut conn)
                .optional()
                .map_err(StorageError::from)?;

            if let Some(db_mapping) = scoped {
                return Ok(Some(db_mapping.into()));
            }
        }

        let global = category_mappings::table
            .filter(category_mappings::external_group_id.eq(external_group_id))
            .filter(category_mappings::store_id.is_null())
            .first::<CategoryMappingDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(global.map(Into::into))
    }
}
