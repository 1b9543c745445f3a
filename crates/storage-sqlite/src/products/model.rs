//! Database models for local products.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use posbridge_core::products::{NewProduct, Product};

use crate::utils::{parse_decimal, parse_rfc3339};

#[derive(
    Queryable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductDB {
    pub id: String,
    pub store_id: Option<String>,
    pub category_id: String,
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub is_available: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductDB> for Product {
    fn from(db: ProductDB) -> Self {
        Self {
            id: db.id,
            store_id: db.store_id,
            category_id: db.category_id,
            external_id: db.external_id,
            name: db.name,
            description: db.description,
            price: parse_decimal(&db.price, "price"),
            stock_quantity: db.stock_quantity,
            is_active: db.is_active,
            is_available: db.is_available,
            created_at: parse_rfc3339(&db.created_at, "created_at"),
            updated_at: parse_rfc3339(&db.updated_at, "updated_at"),
        }
    }
}

impl From<NewProduct> for ProductDB {
    fn from(new: NewProduct) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: new
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            store_id: new.store_id,
            category_id: new.category_id,
            external_id: new.external_id,
            name: new.name,
            description: new.description,
            price: new.price.to_string(),
            stock_quantity: new.stock_quantity,
            is_active: new.is_active,
            is_available: new.is_available,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
