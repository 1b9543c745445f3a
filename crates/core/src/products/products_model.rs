//! Local product domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the local sales catalog.
///
/// `external_id` ties the row to its POS counterpart; menu sync matches on
/// it and never creates a second row for the same (store, external id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub store_id: Option<String>,
    pub category_id: String,
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub is_active: bool,
    /// Cleared while the POS stop list names this product.
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a product from a POS catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub store_id: Option<String>,
    pub category_id: String,
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub is_available: bool,
}

/// Catalog-driven update applied by menu sync to an existing product.
///
/// Only the POS-owned fields; local stock and active flags are untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCatalogUpdate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub is_available: bool,
}
