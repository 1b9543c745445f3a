//! Repository for POS configuration persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use posbridge_core::configurations::{
    ConfigurationRepositoryTrait, NewPosConfiguration, PosConfiguration, PosConfigurationUpdate,
};
use posbridge_core::errors::{DatabaseError, Result};

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::pos_configurations;

use super::model::ConfigurationDB;

pub struct ConfigurationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ConfigurationRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ConfigurationRepositoryTrait for ConfigurationRepository {
    async fn create(&self, new_config: NewPosConfiguration) -> Result<PosConfiguration> {
        new_config.validate()?;

        self.writer
            .exec(move |conn| {
                let db_config: ConfigurationDB = new_config.into();

                diesel::insert_into(pos_configurations::table)
                    .values(&db_config)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(db_config.into())
            })
            .await
    }

    async fn update(
        &self,
        config_id: &str,
        update: PosConfigurationUpdate,
    ) -> Result<PosConfiguration> {
        update.validate()?;
        let config_id = config_id.to_string();

        self.writer
            .exec(move |conn| {
                let mut db_config = pos_configurations::table
                    .find(&config_id)
                    .first::<ConfigurationDB>(conn)
                    .map_err(StorageError::from)?;

                if let Some(name) = update.name {
                    db_config.name = name;
                }
                if let Some(store_id) = update.store_id {
                    db_config.store_id = store_id;
                }
                if let Some(base_url) = update.base_url {
                    db_config.base_url = base_url;
                }
                if let Some(login) = update.login {
                    db_config.login = login;
                }
                if let Some(organization_id) = update.organization_id {
                    db_config.organization_id = organization_id;
                }
                if let Some(organization_name) = update.organization_name {
                    db_config.organization_name = organization_name;
                }
                if let Some(terminal_group_id) = update.terminal_group_id {
                    db_config.terminal_group_id = terminal_group_id;
                }
                if let Some(terminal_group_name) = update.terminal_group_name {
                    db_config.terminal_group_name = terminal_group_name;
                }
                if let Some(auto_sync) = update.auto_sync {
                    db_config.auto_sync = auto_sync;
                }
                if let Some(sync_interval_minutes) = update.sync_interval_minutes {
                    db_config.sync_interval_minutes = sync_interval_minutes;
                }
                if let Some(is_active) = update.is_active {
                    db_config.is_active = is_active;
                }
                db_config.updated_at = Utc::now().to_rfc3339();

                diesel::update(pos_configurations::table.find(&db_config.id))
                    .set(&db_config)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(db_config.into())
            })
            .await
    }

    async fn delete(&self, config_id: &str) -> Result<usize> {
        let config_id = config_id.to_string();

        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(pos_configurations::table.find(&config_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }

    fn get_by_id(&self, config_id: &str) -> Result<PosConfiguration> {
        let mut conn = get_connection(&self.pool)?;

        let db_config = pos_configurations::table
            .find(config_id)
            .first::<ConfigurationDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(db_config.into())
    }

    fn get_active_by_store(&self, store_id: &str) -> Result<Option<PosConfiguration>> {
        let mut conn = get_connection(&self.pool)?;

        // Several rows may target the same store. The most recently
        // updated active one wins.
        let result = pos_configurations::table
            .filter(pos_configurations::store_id.eq(store_id))
            .filter(pos_configurations::is_active.eq(true))
            .order(pos_configurations::updated_at.desc())
            .first::<ConfigurationDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(result.map(Into::into))
    }

    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<PosConfiguration>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = pos_configurations::table.into_boxed();

        if let Some(active) = is_active_filter {
            query = query.filter(pos_configurations::is_active.eq(active));
        }

        let results = query
            .order(pos_configurations::name.asc())
            .load::<ConfigurationDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn store_token(
        &self,
        config_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let config_id = config_id.to_string();
        let token = token.to_string();

        self.writer
            .exec(move |conn| {
                // Deliberately leaves updated_at alone: a token refresh is not
                // a configuration edit and must not reorder store resolution.
                let updated = diesel::update(pos_configurations::table.find(&config_id))
                    .set((
                        pos_configurations::cached_token.eq(Some(token)),
                        pos_configurations::token_expires_at.eq(Some(expires_at.to_rfc3339())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if updated == 0 {
                    return Err(DatabaseError::NotFound(format!(
                        "Configuration {} not found",
                        config_id
                    ))
                    .into());
                }

                Ok(())
            })
            .await
    }

    async fn clear_token(&self, config_id: &str) -> Result<()> {
        let config_id = config_id.to_string();

        self.writer
            .exec(move |conn| {
                diesel::update(pos_configurations::table.find(&config_id))
                    .set((
                        pos_configurations::cached_token.eq(None::<String>),
                        pos_configurations::token_expires_at.eq(None::<String>),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }
}
