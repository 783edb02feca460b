//! Order and line item domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CanonicalAddress, Platform};

// =============================================================================
// Status Types
// =============================================================================

/// Order payment status.
///
/// The `Default` variant is the conservative fallback: platform codes absent
/// from an adapter's lookup table map to `Pending`, never to `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    /// Payment not yet captured.
    #[default]
    Pending,
    /// Payment captured.
    Paid,
    /// Payment refunded (fully or partially).
    Refunded,
    /// Payment voided.
    Voided,
}

/// Order fulfillment status.
///
/// The `Default` variant is the conservative fallback: platform codes absent
/// from an adapter's lookup table map to `Unfulfilled`, never to `Fulfilled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    /// No items shipped.
    #[default]
    Unfulfilled,
    /// Some items shipped.
    Partial,
    /// All items shipped.
    Fulfilled,
    /// Order cancelled before fulfillment completed.
    Cancelled,
}

// =============================================================================
// Supporting Types
// =============================================================================

/// Shipment tracking information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInfo {
    /// Carrier name.
    #[serde(default)]
    pub company: Option<String>,
    /// Tracking number.
    #[serde(default)]
    pub number: Option<String>,
    /// Tracking URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// Point-in-time customer contact snapshot on an order.
///
/// This is a copy, not a live reference - orders retain the contact info as
/// it was at purchase time even if the customer record later changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCustomer {
    /// Platform-native customer ID, when the platform exposes one.
    #[serde(default)]
    pub platform_id: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

// =============================================================================
// Line Item
// =============================================================================

/// A line item in an order.
///
/// Product and variant references are weak, platform-scoped ids - lookup
/// only, never ownership, since the referenced product may have been deleted
/// or re-synced after the order was placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalLineItem {
    /// Platform-native line item ID.
    #[serde(default)]
    pub platform_id: String,
    /// Referenced product ID (weak reference).
    #[serde(default)]
    pub product_id: Option<String>,
    /// Referenced variant ID (weak reference).
    #[serde(default)]
    pub variant_id: Option<String>,
    /// Merchant-defined SKU.
    #[serde(default)]
    pub sku: Option<String>,
    /// Item title at purchase time.
    #[serde(default)]
    pub title: String,
    /// Quantity ordered. Always at least 1; mapping clamps bad data.
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    /// Unit price at purchase time.
    #[serde(default)]
    pub price: Decimal,
    /// Item-level discount total.
    #[serde(default)]
    pub total_discount: Decimal,
    /// Item-level tax. Zero when the platform omits per-item tax.
    #[serde(default)]
    pub tax: Decimal,
    /// Line total after item-level discounts.
    #[serde(default)]
    pub total_price: Decimal,
}

const fn default_quantity() -> i64 {
    1
}

impl CanonicalLineItem {
    /// The total this line should carry: `price * quantity - discount`.
    #[must_use]
    pub fn expected_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity) - self.total_discount
    }

    /// Whether `total_price` matches the expected total within `tolerance`.
    ///
    /// Platforms round item-level discounts differently, so exact equality
    /// is not required.
    #[must_use]
    pub fn total_reconciles(&self, tolerance: Decimal) -> bool {
        (self.total_price - self.expected_total()).abs() <= tolerance
    }
}

// =============================================================================
// Order
// =============================================================================

/// Default reconciliation tolerance: one minor currency unit.
///
/// Platforms round line-level tax and discounts differently; the totals
/// invariant is checked to the cent, not to exact equality.
pub const RECONCILE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// An order in the canonical model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalOrder {
    /// Source platform.
    pub platform: Platform,
    /// Platform-native order ID.
    #[serde(default)]
    pub platform_id: String,
    /// Human-facing order number (e.g., "1001").
    #[serde(default)]
    pub order_number: Option<String>,
    /// Customer contact snapshot at purchase time.
    #[serde(default)]
    pub customer: OrderCustomer,
    /// Line items, in the order the platform reports them.
    #[serde(default)]
    pub line_items: Vec<CanonicalLineItem>,
    /// ISO 4217 currency code for all totals.
    #[serde(default = "default_currency")]
    pub currency_code: String,
    /// Subtotal before tax, shipping, and discounts.
    #[serde(default)]
    pub subtotal_price: Decimal,
    /// Total tax.
    #[serde(default)]
    pub total_tax: Decimal,
    /// Total shipping charges.
    #[serde(default)]
    pub total_shipping: Decimal,
    /// Total discounts applied.
    #[serde(default)]
    pub total_discounts: Decimal,
    /// Grand total.
    #[serde(default)]
    pub total_price: Decimal,
    /// Payment status.
    #[serde(default)]
    pub financial_status: FinancialStatus,
    /// Fulfillment status.
    #[serde(default)]
    pub fulfillment_status: FulfillmentStatus,
    /// Shipping address.
    #[serde(default)]
    pub shipping_address: Option<CanonicalAddress>,
    /// Billing address.
    #[serde(default)]
    pub billing_address: Option<CanonicalAddress>,
    /// Shipment tracking entries.
    #[serde(default)]
    pub tracking: Vec<TrackingInfo>,
    /// Merchant note.
    #[serde(default)]
    pub note: Option<String>,
    /// When the platform created the order.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the platform last updated the order.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Deep link into the platform's admin UI.
    #[serde(default)]
    pub platform_url: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl CanonicalOrder {
    /// Create an empty order with the given identity and defaults for every
    /// other field.
    #[must_use]
    pub fn new(platform: Platform, platform_id: impl Into<String>) -> Self {
        Self {
            platform,
            platform_id: platform_id.into(),
            order_number: None,
            customer: OrderCustomer::default(),
            line_items: Vec::new(),
            currency_code: default_currency(),
            subtotal_price: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            total_shipping: Decimal::ZERO,
            total_discounts: Decimal::ZERO,
            total_price: Decimal::ZERO,
            financial_status: FinancialStatus::default(),
            fulfillment_status: FulfillmentStatus::default(),
            shipping_address: None,
            billing_address: None,
            tracking: Vec::new(),
            note: None,
            created_at: None,
            updated_at: None,
            platform_url: None,
        }
    }

    /// Whether `total_price` matches
    /// `subtotal + tax + shipping - discounts` within `tolerance`.
    #[must_use]
    pub fn totals_reconcile(&self, tolerance: Decimal) -> bool {
        let expected =
            self.subtotal_price + self.total_tax + self.total_shipping - self.total_discounts;
        (self.total_price - expected).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn test_conservative_defaults() {
        assert_eq!(FinancialStatus::default(), FinancialStatus::Pending);
        assert_eq!(FulfillmentStatus::default(), FulfillmentStatus::Unfulfilled);
    }

    #[test]
    fn test_totals_reconcile_within_tolerance() {
        let mut order = CanonicalOrder::new(Platform::Woocommerce, "991");
        order.subtotal_price = dec("100.00");
        order.total_tax = dec("8.25");
        order.total_shipping = dec("5.00");
        order.total_discounts = dec("10.00");
        // One cent of platform rounding drift
        order.total_price = dec("103.26");
        assert!(order.totals_reconcile(RECONCILE_TOLERANCE));

        order.total_price = dec("103.50");
        assert!(!order.totals_reconcile(RECONCILE_TOLERANCE));
    }

    #[test]
    fn test_line_item_total_reconciles() {
        let item = CanonicalLineItem {
            quantity: 3,
            price: dec("19.99"),
            total_discount: dec("5.00"),
            total_price: dec("54.97"),
            ..CanonicalLineItem::default()
        };
        assert_eq!(item.expected_total(), dec("54.97"));
        assert!(item.total_reconciles(RECONCILE_TOLERANCE));
    }

    #[test]
    fn test_line_item_default_quantity_is_one() {
        let item: CanonicalLineItem = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_customer_snapshot_is_owned() {
        // The snapshot carries values, not references; serializing an order
        // embeds the contact info as-of purchase time.
        let mut order = CanonicalOrder::new(Platform::Ebay, "17-001");
        order.customer.email = Some("buyer@example.com".to_string());
        let json = serde_json::to_value(&order).expect("serialize");
        assert_eq!(json["customer"]["email"], "buyer@example.com");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FulfillmentStatus::Partial).expect("serialize"),
            "\"partial\""
        );
        assert_eq!(
            serde_json::to_string(&FinancialStatus::Voided).expect("serialize"),
            "\"voided\""
        );
    }
}
