//! Raw payload types for the Amazon Selling Partner API.
//!
//! Field names mirror the SP-API JSON exactly; everything optional in
//! practice is optional here so partial payloads deserialize cleanly and
//! get defaulted at the mapping boundary.

use serde::Deserialize;

// =============================================================================
// Envelope Types
// =============================================================================

/// SP-API responses wrap their data in a `payload` object.
#[derive(Debug, Deserialize)]
pub struct SpApiEnvelope<T> {
    pub payload: T,
}

// =============================================================================
// Money
// =============================================================================

/// SP-API money object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpMoney {
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

// =============================================================================
// Orders API (v0)
// =============================================================================

/// `GET /orders/v0/orders` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrdersPayload {
    #[serde(default)]
    pub orders: Vec<SpOrder>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// One order from the Orders API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpOrder {
    pub amazon_order_id: String,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub last_update_date: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub order_total: Option<SpMoney>,
    #[serde(default)]
    pub buyer_info: Option<SpBuyerInfo>,
    #[serde(default)]
    pub shipping_address: Option<SpAddress>,
}

/// Restricted buyer information. Amazon exposes contact data only through
/// this per-order snapshot; there is no customer records API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpBuyerInfo {
    #[serde(default)]
    pub buyer_email: Option<String>,
    #[serde(default)]
    pub buyer_name: Option<String>,
}

/// SP-API address object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpAddress {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state_or_region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// `GET /orders/v0/orders/{orderId}/orderItems` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderItemsPayload {
    #[serde(default)]
    pub order_items: Vec<SpOrderItem>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// One order line item.
///
/// `ItemPrice` is the line total (unit price times quantity), not the unit
/// price; `ItemTax` and `PromotionDiscount` are likewise line-level.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpOrderItem {
    pub order_item_id: String,
    /// Amazon Standard Identification Number - platform-assigned, distinct
    /// from the merchant SKU namespace.
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub seller_sku: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub quantity_ordered: Option<i64>,
    #[serde(default)]
    pub item_price: Option<SpMoney>,
    #[serde(default)]
    pub item_tax: Option<SpMoney>,
    #[serde(default)]
    pub promotion_discount: Option<SpMoney>,
}

// =============================================================================
// Listings Items API (2021-08-01)
// =============================================================================

/// `GET /listings/2021-08-01/items/{sellerId}` search response.
#[derive(Debug, Deserialize)]
pub struct ListingsSearchResponse {
    #[serde(default)]
    pub items: Vec<ListingsItem>,
    #[serde(default)]
    pub pagination: Option<ListingsPagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsPagination {
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One listings item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsItem {
    pub sku: String,
    #[serde(default)]
    pub summaries: Vec<ListingsItemSummary>,
    #[serde(default)]
    pub offers: Vec<ListingsItemOffer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsItemSummary {
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub status: Vec<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub last_updated_date: Option<String>,
    #[serde(default)]
    pub main_image: Option<ListingsItemImage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsItemImage {
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsItemOffer {
    #[serde(default)]
    pub price: Option<ListingsOfferPrice>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsOfferPrice {
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

/// Mutation acknowledgement from the Listings Items API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsSubmissionResponse {
    #[serde(default)]
    pub sku: Option<String>,
}

// =============================================================================
// FBA Inventory API (v1)
// =============================================================================

/// `GET /fba/inventory/v1/summaries` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummariesPayload {
    #[serde(default)]
    pub inventory_summaries: Vec<InventorySummary>,
}

/// Top-level FBA inventory response: pagination sits beside the payload.
#[derive(Debug, Deserialize)]
pub struct InventorySummariesResponse {
    pub payload: InventorySummariesPayload,
    #[serde(default)]
    pub pagination: Option<InventoryPagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPagination {
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Per-SKU FBA inventory summary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    #[serde(default)]
    pub seller_sku: Option<String>,
    #[serde(default)]
    pub total_quantity: Option<i64>,
    #[serde(default)]
    pub inventory_details: Option<InventoryDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDetails {
    #[serde(default)]
    pub inbound_working_quantity: Option<i64>,
    #[serde(default)]
    pub reserved_quantity: Option<ReservedQuantity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedQuantity {
    #[serde(default)]
    pub total_reserved_quantity: Option<i64>,
}

// =============================================================================
// Sellers API
// =============================================================================

/// `GET /sellers/v1/marketplaceParticipations` payload entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceParticipation {
    pub marketplace: Marketplace,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marketplace {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Notifications API
// =============================================================================

/// `POST /notifications/v1/subscriptions/{type}` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPayload {
    pub subscription_id: String,
}
