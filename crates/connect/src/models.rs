//! Wire types for the POS transport API.
//!
//! Shapes are deliberately tolerant: collections and optional attributes
//! default instead of failing the whole payload, because POS builds differ
//! in which fields they send.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use posbridge_core::configurations::PosConfiguration;
use posbridge_core::orders::OrderPayload;

/// Successful response of the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthResponse {
    pub token: String,
    /// Absent on POS builds that only honor their default token lifetime.
    #[serde(default)]
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One catalog snapshot: everything an organization currently sells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Nomenclature {
    /// Monotonic catalog version; bumps whenever the POS menu changes.
    #[serde(default)]
    pub revision: i64,
    #[serde(default)]
    pub groups: Vec<PosGroup>,
    #[serde(default)]
    pub products: Vec<PosProduct>,
}

/// A catalog group (the POS-side notion of a category).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PosGroup {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// A sellable item in the POS catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PosProduct {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub parent_group_id: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    /// Items excluded from the menu are internal (modifiers, write-offs).
    #[serde(default = "default_included")]
    pub is_included_in_menu: bool,
}

impl PosProduct {
    /// Menu name with the id as a last resort; the POS occasionally sends
    /// unnamed items.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.clone())
    }
}

fn default_included() -> bool {
    true
}

/// An organization visible to the configured login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrganizationInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationsResponse {
    #[serde(default)]
    pub organizations: Vec<OrganizationInfo>,
}

/// A terminal group (order delivery endpoint) within an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminalGroupInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TerminalGroupsResponse {
    #[serde(default)]
    pub terminal_groups: Vec<TerminalGroupInfo>,
}

/// One stopped product. A `balance` of zero (or none at all) means sold out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StopListItem {
    pub product_id: String,
    #[serde(default)]
    pub balance: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StopListResponse {
    #[serde(default)]
    pub items: Vec<StopListItem>,
}

/// Order delivery request pushed to the POS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateOrderRequest {
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_group_id: Option<String>,
    pub order: OrderBody,
}

impl CreateOrderRequest {
    /// Builds the POS request from a queued payload and the configuration
    /// it resolved to.
    pub fn from_payload(config: &PosConfiguration, payload: &OrderPayload) -> Self {
        Self {
            organization_id: config.organization_id.clone(),
            terminal_group_id: config.terminal_group_id.clone(),
            order: OrderBody {
                external_number: payload.order_number.clone(),
                comment: payload.comment.clone(),
                customer: payload.customer.as_ref().map(|customer| OrderCustomerBody {
                    name: customer.name.clone(),
                    phone: customer.phone.clone(),
                }),
                items: payload
                    .items
                    .iter()
                    .map(|line| OrderItemBody {
                        product_id: line.external_product_id.clone(),
                        amount: line.quantity,
                        price: line.unit_price,
                    })
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrderBody {
    /// The local order number; the POS echoes it on receipts.
    pub external_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<OrderCustomerBody>,
    pub items: Vec<OrderItemBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrderCustomerBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrderItemBody {
    pub product_id: String,
    pub amount: Decimal,
    pub price: Decimal,
}

/// POS-side identifiers returned for an accepted order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateOrderResponse {
    pub order_id: String,
    #[serde(default)]
    pub ticket_number: Option<String>,
}
