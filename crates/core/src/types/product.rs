//! Product and variant domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Platform;

// =============================================================================
// Status Types
// =============================================================================

/// Product lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Published and purchasable.
    Active,
    /// Not yet published.
    #[default]
    Draft,
    /// Removed from sale but retained for history.
    Archived,
}

// =============================================================================
// Supporting Types
// =============================================================================

/// Product image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Platform-native image ID.
    #[serde(default)]
    pub platform_id: Option<String>,
    /// Image URL.
    #[serde(default)]
    pub url: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt_text: Option<String>,
    /// Display position (1-based).
    #[serde(default)]
    pub position: Option<i64>,
}

/// Search engine listing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoFields {
    /// Page title override.
    #[serde(default)]
    pub title: Option<String>,
    /// Meta description.
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Variant
// =============================================================================

/// A purchasable variant of a product.
///
/// A variant belongs to exactly one [`CanonicalProduct`]; ownership is
/// exclusive to the parent product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalVariant {
    /// Platform-native variant ID.
    #[serde(default)]
    pub platform_id: String,
    /// Merchant-defined SKU.
    #[serde(default)]
    pub sku: Option<String>,
    /// Variant title (e.g., "Small / Red").
    #[serde(default)]
    pub title: String,
    /// Variant price.
    #[serde(default)]
    pub price: Decimal,
    /// Compare-at (strike-through) price.
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    /// On-hand quantity for this variant.
    #[serde(default)]
    pub inventory_quantity: i64,
    /// Option name/value pairs (e.g., "Size" -> "Small").
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    /// Variant-specific image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the canonical catalog.
///
/// Identity is the pair (platform, `platform_id`), unique within a
/// platform's catalog. The SKU namespace is merchant-defined and distinct
/// from platform-assigned identifiers (an Amazon ASIN is a `platform_id`,
/// never a SKU).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    /// Source platform.
    pub platform: Platform,
    /// Platform-native product ID.
    #[serde(default)]
    pub platform_id: String,
    /// Merchant-defined SKU.
    #[serde(default)]
    pub sku: Option<String>,
    /// Product title.
    #[serde(default)]
    pub title: String,
    /// Product description (may contain platform HTML).
    #[serde(default)]
    pub description: String,
    /// Vendor/brand name.
    #[serde(default)]
    pub vendor: Option<String>,
    /// Selling price. Never negative; mapping clamps bad upstream data.
    #[serde(default)]
    pub price: Decimal,
    /// Compare-at (strike-through) price.
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    /// Unit cost, when the platform reports it.
    #[serde(default)]
    pub cost: Option<Decimal>,
    /// ISO 4217 currency code for all prices on this product.
    #[serde(default = "default_currency")]
    pub currency_code: String,
    /// Total on-hand quantity across variants.
    #[serde(default)]
    pub inventory_quantity: i64,
    /// Variants of this product.
    #[serde(default)]
    pub variants: Vec<CanonicalVariant>,
    /// Product images.
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: ProductStatus,
    /// Search engine listing fields.
    #[serde(default)]
    pub seo: SeoFields,
    /// Free-form platform metadata that has no canonical field.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// When the platform created the product.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the platform last updated the product.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Deep link into the platform's admin UI.
    #[serde(default)]
    pub platform_url: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl CanonicalProduct {
    /// Create an empty product with the given identity and defaults for
    /// every other field.
    #[must_use]
    pub fn new(platform: Platform, platform_id: impl Into<String>) -> Self {
        Self {
            platform,
            platform_id: platform_id.into(),
            sku: None,
            title: String::new(),
            description: String::new(),
            vendor: None,
            price: Decimal::ZERO,
            compare_at_price: None,
            cost: None,
            currency_code: default_currency(),
            inventory_quantity: 0,
            variants: Vec::new(),
            images: Vec::new(),
            status: ProductStatus::default(),
            seo: SeoFields::default(),
            metadata: BTreeMap::new(),
            created_at: None,
            updated_at: None,
            platform_url: None,
        }
    }

    /// Profit margin as a percentage: `((price - cost) / price) * 100`.
    ///
    /// Returns `None` when the cost is unknown or the price is zero (the
    /// division guard), so callers never see a spurious margin.
    #[must_use]
    pub fn profit_margin(&self) -> Option<Decimal> {
        let cost = self.cost?;
        if self.price.is_zero() {
            return None;
        }
        Some((self.price - cost) / self.price * Decimal::from(100))
    }

    /// Whether on-hand quantity is at or below `threshold` but not zero.
    #[must_use]
    pub const fn is_low_stock(&self, threshold: i64) -> bool {
        self.inventory_quantity > 0 && self.inventory_quantity <= threshold
    }

    /// Whether the product is out of stock.
    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        self.inventory_quantity <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: &str, cost: Option<&str>) -> CanonicalProduct {
        let mut p = CanonicalProduct::new(Platform::Amazon, "B07XYZ");
        p.price = price.parse().expect("price");
        p.cost = cost.map(|c| c.parse().expect("cost"));
        p
    }

    #[test]
    fn test_profit_margin() {
        let margin = product("100.00", Some("40.00"))
            .profit_margin()
            .expect("margin");
        assert_eq!(margin, Decimal::from(60));
    }

    #[test]
    fn test_profit_margin_zero_price() {
        // Divide-by-zero guard: free products have no margin
        assert!(product("0", Some("5.00")).profit_margin().is_none());
    }

    #[test]
    fn test_profit_margin_unknown_cost() {
        assert!(product("19.99", None).profit_margin().is_none());
    }

    #[test]
    fn test_stock_predicates() {
        let mut p = product("10.00", None);
        p.inventory_quantity = 3;
        assert!(p.is_low_stock(5));
        assert!(!p.is_out_of_stock());

        p.inventory_quantity = 0;
        assert!(!p.is_low_stock(5));
        assert!(p.is_out_of_stock());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ProductStatus::Archived).expect("serialize");
        assert_eq!(json, "\"archived\"");
    }

    #[test]
    fn test_partial_payload_deserializes_with_defaults() {
        // Downstream consumers must never see missing fields
        let p: CanonicalProduct =
            serde_json::from_str(r#"{"platform":"amazon","platform_id":"B07XYZ"}"#)
                .expect("deserialize");
        assert_eq!(p.platform_id, "B07XYZ");
        assert_eq!(p.status, ProductStatus::Draft);
        assert_eq!(p.currency_code, "USD");
        assert!(p.variants.is_empty());
    }
}
