//! Raw payload types for the WooCommerce REST API (wc/v3).
//!
//! WooCommerce reports money as decimal strings and timestamps in both
//! site-local and GMT variants; mapping reads only the `_gmt` fields.

use serde::Deserialize;

// =============================================================================
// Products
// =============================================================================

/// One product from `/wp-json/wc/v3/products`.
#[derive(Debug, Clone, Deserialize)]
pub struct WcProduct {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    /// "simple", "variable", "grouped", or "external".
    #[serde(default, rename = "type")]
    pub product_type: Option<String>,
    /// "draft", "pending", "private", or "publish".
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub regular_price: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub date_created_gmt: Option<String>,
    #[serde(default)]
    pub date_modified_gmt: Option<String>,
    /// Variation IDs; the variation objects live on a sub-resource.
    #[serde(default)]
    pub variations: Vec<i64>,
    #[serde(default)]
    pub images: Vec<WcImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WcImage {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// One variation from `/products/{id}/variations`.
#[derive(Debug, Clone, Deserialize)]
pub struct WcVariation {
    pub id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub regular_price: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub attributes: Vec<WcAttribute>,
    #[serde(default)]
    pub image: Option<WcImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WcAttribute {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub option: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// One order from `/wp-json/wc/v3/orders`. Line items arrive inline.
#[derive(Debug, Clone, Deserialize)]
pub struct WcOrder {
    pub id: i64,
    #[serde(default)]
    pub number: Option<String>,
    /// "pending", "processing", "on-hold", "completed", "cancelled",
    /// "refunded", "failed", or "trash".
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub customer_note: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub total_tax: Option<String>,
    #[serde(default)]
    pub shipping_total: Option<String>,
    #[serde(default)]
    pub discount_total: Option<String>,
    #[serde(default)]
    pub date_created_gmt: Option<String>,
    #[serde(default)]
    pub date_modified_gmt: Option<String>,
    #[serde(default)]
    pub billing: Option<WcAddress>,
    #[serde(default)]
    pub shipping: Option<WcAddress>,
    #[serde(default)]
    pub line_items: Vec<WcLineItem>,
}

/// Billing/shipping block on orders and customers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WcAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address_1: Option<String>,
    #[serde(default)]
    pub address_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One inline order line item.
///
/// `subtotal` is the line total before discounts, `total` after; the
/// per-item discount is their difference.
#[derive(Debug, Clone, Deserialize)]
pub struct WcLineItem {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub variation_id: Option<i64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub subtotal: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub total_tax: Option<String>,
}

// =============================================================================
// Customers
// =============================================================================

/// One customer from `/wp-json/wc/v3/customers`.
#[derive(Debug, Clone, Deserialize)]
pub struct WcCustomer {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Reported by stores still running the legacy v2 surface.
    #[serde(default)]
    pub orders_count: Option<i64>,
    #[serde(default)]
    pub total_spent: Option<String>,
    #[serde(default)]
    pub date_created_gmt: Option<String>,
    #[serde(default)]
    pub date_modified_gmt: Option<String>,
    #[serde(default)]
    pub billing: Option<WcAddress>,
    #[serde(default)]
    pub shipping: Option<WcAddress>,
}

// =============================================================================
// Webhooks / System
// =============================================================================

/// One webhook from `/wp-json/wc/v3/webhooks`.
#[derive(Debug, Deserialize)]
pub struct WcWebhook {
    pub id: i64,
}

/// Store identity from `/wp-json/wc/v3/system_status`.
#[derive(Debug, Deserialize)]
pub struct WcSystemStatus {
    #[serde(default)]
    pub environment: Option<WcEnvironment>,
}

#[derive(Debug, Deserialize)]
pub struct WcEnvironment {
    #[serde(default)]
    pub site_url: Option<String>,
}
