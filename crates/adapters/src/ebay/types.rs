//! Raw payload types for the eBay Sell APIs.
//!
//! Orders come from the Fulfillment API, catalog and stock from the
//! Inventory API. Money objects carry `value` strings parsed defensively
//! at the mapping boundary.

use serde::Deserialize;

// =============================================================================
// Money
// =============================================================================

/// eBay amount object.
#[derive(Debug, Clone, Deserialize)]
pub struct EbAmount {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

// =============================================================================
// Fulfillment API - Orders
// =============================================================================

/// `GET /sell/fulfillment/v1/order` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSearchResponse {
    #[serde(default)]
    pub orders: Vec<EbOrder>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbOrder {
    pub order_id: String,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    /// `NOT_STARTED`, `IN_PROGRESS`, or `FULFILLED`.
    #[serde(default)]
    pub order_fulfillment_status: Option<String>,
    /// `PENDING`, `PAID`, `FAILED`, `PARTIALLY_REFUNDED`, `FULLY_REFUNDED`.
    #[serde(default)]
    pub order_payment_status: Option<String>,
    #[serde(default)]
    pub cancel_status: Option<EbCancelStatus>,
    #[serde(default)]
    pub buyer: Option<EbBuyer>,
    #[serde(default)]
    pub pricing_summary: Option<EbPricingSummary>,
    #[serde(default)]
    pub line_items: Vec<EbLineItem>,
    #[serde(default)]
    pub fulfillment_start_instructions: Vec<EbFulfillmentInstruction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbCancelStatus {
    /// `NONE_REQUESTED`, `IN_PROGRESS`, or `CANCELED`.
    #[serde(default)]
    pub cancel_state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbBuyer {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub buyer_registration_address: Option<EbRegistrationAddress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbRegistrationAddress {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub primary_phone: Option<EbPhone>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbPhone {
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbPricingSummary {
    #[serde(default)]
    pub price_subtotal: Option<EbAmount>,
    #[serde(default)]
    pub price_discount: Option<EbAmount>,
    #[serde(default)]
    pub delivery_cost: Option<EbAmount>,
    #[serde(default)]
    pub tax: Option<EbAmount>,
    #[serde(default)]
    pub total: Option<EbAmount>,
}

/// One order line item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbLineItem {
    pub line_item_id: String,
    /// Listing ID on the marketplace.
    #[serde(default)]
    pub legacy_item_id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Unit cost of the item.
    #[serde(default)]
    pub line_item_cost: Option<EbAmount>,
    /// Line total after discounts.
    #[serde(default)]
    pub total: Option<EbAmount>,
    #[serde(default)]
    pub taxes: Vec<EbTax>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbTax {
    #[serde(default)]
    pub amount: Option<EbAmount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbFulfillmentInstruction {
    #[serde(default)]
    pub shipping_step: Option<EbShippingStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbShippingStep {
    #[serde(default)]
    pub ship_to: Option<EbShipTo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbShipTo {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub contact_address: Option<EbContactAddress>,
    #[serde(default)]
    pub primary_phone: Option<EbPhone>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbContactAddress {
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state_or_province: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

// =============================================================================
// Inventory API
// =============================================================================

/// `GET /sell/inventory/v1/inventory_item` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemsResponse {
    #[serde(default)]
    pub inventory_items: Vec<EbInventoryItem>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One inventory item. Pricing lives on offers, not here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbInventoryItem {
    pub sku: String,
    #[serde(default)]
    pub product: Option<EbProductDetails>,
    #[serde(default)]
    pub availability: Option<EbAvailability>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbProductDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbAvailability {
    #[serde(default)]
    pub ship_to_location_availability: Option<EbShipToLocationAvailability>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbShipToLocationAvailability {
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// `GET /sell/inventory/v1/offer?sku=` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersResponse {
    #[serde(default)]
    pub offers: Vec<EbOffer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbOffer {
    #[serde(default)]
    pub pricing_summary: Option<EbOfferPricing>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbOfferPricing {
    #[serde(default)]
    pub price: Option<EbAmount>,
}

// =============================================================================
// Account / Notifications
// =============================================================================

/// `GET /sell/account/v1/privilege` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeResponse {
    #[serde(default)]
    pub seller_registration_completed: Option<bool>,
}

/// `POST /commerce/notification/v1/subscription` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    #[serde(default)]
    pub subscription_id: Option<String>,
}
