//! Repository for menu sync record persistence.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use posbridge_core::constants::MENU_SYNC_RUN_MARKER;
use posbridge_core::errors::Result;
use posbridge_core::menu::{
    MenuSyncRecord, MenuSyncRecordRepositoryTrait, MenuSyncRecordUpsert, MenuSyncStatus,
};

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::menu_sync_records;

use super::model::MenuSyncRecordDB;

pub struct MenuSyncRecordRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl MenuSyncRecordRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl MenuSyncRecordRepositoryTrait for MenuSyncRecordRepository {
    async fn upsert(&self, record: MenuSyncRecordUpsert) -> Result<MenuSyncRecord> {
        self.writer
            .exec(move |conn| {
                let now_str = Utc::now().to_rfc3339();

                let existing = menu_sync_records::table
                    .find((&record.config_id, &record.external_product_id))
                    .first::<MenuSyncRecordDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                match existing {
                    Some(prev) => {
                        let db_record =
                            MenuSyncRecordDB::from_upsert(record, prev.created_at, now_str);

                        diesel::update(menu_sync_records::table.find((
                            &db_record.config_id,
                            &db_record.external_product_id,
                        )))
                        .set(&db_record)
                        .execute(conn)
                        .map_err(StorageError::from)?;

                        Ok(db_record.into())
                    }
                    None => {
                        let db_record =
                            MenuSyncRecordDB::from_upsert(record, now_str.clone(), now_str);

                        diesel::insert_into(menu_sync_records::table)
                            .values(&db_record)
                            .execute(conn)
                            .map_err(StorageError::from)?;

                        Ok(db_record.into())
                    }
                }
            })
            .await
    }

    fn get(
        &self,
        config_id: &str,
        external_product_id: &str,
    ) -> Result<Option<MenuSyncRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = menu_sync_records::table
            .find((config_id, external_product_id))
            .first::<MenuSyncRecordDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(Into::into))
    }

    fn list_for_config(
        &self,
        config_id: &str,
        status_filter: Option<MenuSyncStatus>,
    ) -> Result<Vec<MenuSyncRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = menu_sync_records::table
            .filter(menu_sync_records::config_id.eq(config_id))
            .into_boxed();

        match status_filter {
            Some(status) => {
                query = query.filter(menu_sync_records::sync_status.eq(status.as_str()));
            }
            None => {
                // Unfiltered listings are about products; the sentinel row
                // is reached through last_run_marker instead.
                query = query
                    .filter(menu_sync_records::external_product_id.ne(MENU_SYNC_RUN_MARKER));
            }
        }

        let rows = query
            .order(menu_sync_records::updated_at.desc())
            .load::<MenuSyncRecordDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn last_run_marker(&self, config_id: &str) -> Result<Option<MenuSyncRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = menu_sync_records::table
            .find((config_id, MENU_SYNC_RUN_MARKER))
            .first::<MenuSyncRecordDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(Into::into))
    }
}
