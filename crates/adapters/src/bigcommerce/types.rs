//! Raw payload types for the BigCommerce REST API.
//!
//! Catalog and customers use the v3 API (enveloped in `data`/`meta`);
//! orders remain on v2 (bare arrays, RFC 2822 dates). Numeric money fields
//! arrive as strings and are parsed defensively at the mapping boundary.

use serde::Deserialize;

// =============================================================================
// v3 Envelope
// =============================================================================

/// v3 responses wrap their data and carry pagination metadata.
#[derive(Debug, Deserialize)]
pub struct V3Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Option<V3Meta>,
}

#[derive(Debug, Deserialize)]
pub struct V3Meta {
    #[serde(default)]
    pub pagination: Option<V3Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct V3Pagination {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

// =============================================================================
// Catalog (v3)
// =============================================================================

/// One product from `/v3/catalog/products`.
#[derive(Debug, Clone, Deserialize)]
pub struct BcProduct {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cost_price: Option<f64>,
    #[serde(default)]
    pub retail_price: Option<f64>,
    #[serde(default)]
    pub inventory_level: Option<i64>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_modified: Option<String>,
    #[serde(default)]
    pub variants: Vec<BcVariant>,
    #[serde(default)]
    pub images: Vec<BcImage>,
}

/// One product variant.
#[derive(Debug, Clone, Deserialize)]
pub struct BcVariant {
    pub id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub calculated_price: Option<f64>,
    #[serde(default)]
    pub inventory_level: Option<i64>,
    #[serde(default)]
    pub option_values: Vec<BcOptionValue>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BcOptionValue {
    #[serde(default)]
    pub option_display_name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BcImage {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub url_standard: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

// =============================================================================
// Orders (v2)
// =============================================================================

/// One order from `/v2/orders`. Money fields are decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct BcOrder {
    pub id: i64,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_modified: Option<String>,
    #[serde(default)]
    pub subtotal_ex_tax: Option<String>,
    #[serde(default)]
    pub total_inc_tax: Option<String>,
    #[serde(default)]
    pub total_tax: Option<String>,
    #[serde(default)]
    pub shipping_cost_ex_tax: Option<String>,
    #[serde(default)]
    pub discount_amount: Option<String>,
    #[serde(default)]
    pub coupon_discount: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub staff_notes: Option<String>,
    #[serde(default)]
    pub billing_address: Option<BcOrderAddress>,
}

/// Billing/shipping address on a v2 order.
#[derive(Debug, Clone, Deserialize)]
pub struct BcOrderAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub street_1: Option<String>,
    #[serde(default)]
    pub street_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country_iso2: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One line item from `/v2/orders/{id}/products`.
#[derive(Debug, Clone, Deserialize)]
pub struct BcOrderProduct {
    pub id: i64,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub variant_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub price_ex_tax: Option<String>,
    #[serde(default)]
    pub total_ex_tax: Option<String>,
    /// Absent when the store does not tax the item.
    #[serde(default)]
    pub total_tax: Option<String>,
    #[serde(default)]
    pub applied_discounts: Vec<BcAppliedDiscount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BcAppliedDiscount {
    #[serde(default)]
    pub amount: Option<String>,
}

// =============================================================================
// Customers (v3)
// =============================================================================

/// One customer from `/v3/customers`.
#[derive(Debug, Clone, Deserialize)]
pub struct BcCustomer {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub accepts_product_review_abandoned_cart_emails: Option<bool>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_modified: Option<String>,
    #[serde(default)]
    pub addresses: Vec<BcCustomerAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BcCustomerAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state_or_province: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

// =============================================================================
// Store / OAuth / Webhooks
// =============================================================================

/// `GET /v2/store` response.
#[derive(Debug, Deserialize)]
pub struct BcStore {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

/// OAuth token exchange response. BigCommerce tokens do not expire.
#[derive(Debug, Deserialize)]
pub struct BcTokenResponse {
    pub access_token: String,
}

/// One webhook from `/v3/hooks`.
#[derive(Debug, Deserialize)]
pub struct BcWebhook {
    pub id: i64,
}
