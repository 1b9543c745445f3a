//! Repository for local product persistence.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use posbridge_core::errors::Result;
use posbridge_core::products::{
    NewProduct, Product, ProductCatalogUpdate, ProductRepositoryTrait,
};

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::products;

use super::model::ProductDB;

pub struct ProductRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ProductRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    async fn create(&self, new_product: NewProduct) -> Result<Product> {
        self.writer
            .exec(move |conn| {
                let db_product: ProductDB = new_product.into();

                diesel::insert_into(products::table)
                    .values(&db_product)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(db_product.into())
            })
            .await
    }

    async fn apply_catalog_update(
        &self,
        product_id: &str,
        update: ProductCatalogUpdate,
    ) -> Result<Product> {
        let product_id = product_id.to_string();

        self.writer
            .exec(move |conn| {
                diesel::update(products::table.find(&product_id))
                    .set((
                        products::name.eq(update.name),
                        products::description.eq(update.description),
                        products::price.eq(update.price.to_string()),
                        products::is_available.eq(update.is_available),
                        products::updated_at.eq(Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let row = products::table
                    .find(&product_id)
                    .first::<ProductDB>(conn)
                    .map_err(StorageError::from)?;

                Ok(row.into())
            })
            .await
    }

    fn get_by_external_id(
        &self,
        external_id: &str,
        store_id: Option<&str>,
    ) -> Result<Option<Product>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = products::table
            .filter(products::external_id.eq(external_id))
            .into_boxed();

        query = match store_id {
            Some(store) => query.filter(products::store_id.eq(store.to_string())),
            None => query.filter(products::store_id.is_null()),
        };

        let row = query
            .first::<ProductDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(Into::into))
    }

    fn list(&self, store_id: Option<&str>) -> Result<Vec<Product>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = products::table.into_boxed();

        if let Some(store) = store_id {
            query = query.filter(products::store_id.eq(store.to_string()));
        }

        let rows = query
            .order(products::name.asc())
            .load::<ProductDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
