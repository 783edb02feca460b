//! Inventory snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Platform;

/// Per-SKU inventory snapshot at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalInventory {
    /// Source platform.
    pub platform: Platform,
    /// Merchant-defined SKU.
    #[serde(default)]
    pub sku: String,
    /// Platform-native location ID, when the platform tracks locations.
    #[serde(default)]
    pub location_id: Option<String>,
    /// On-hand quantity.
    #[serde(default)]
    pub quantity: i64,
    /// Quantity reserved by open orders.
    #[serde(default)]
    pub reserved_quantity: i64,
    /// Quantity inbound from suppliers.
    #[serde(default)]
    pub incoming_quantity: i64,
    /// When the platform last reported this snapshot.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CanonicalInventory {
    /// Create a snapshot with the given identity and zero quantities.
    #[must_use]
    pub fn new(platform: Platform, sku: impl Into<String>) -> Self {
        Self {
            platform,
            sku: sku.into(),
            location_id: None,
            quantity: 0,
            reserved_quantity: 0,
            incoming_quantity: 0,
            updated_at: None,
        }
    }

    /// Sellable quantity: `max(0, quantity - reserved_quantity)`.
    ///
    /// Never negative, regardless of upstream data quality - platforms do
    /// report reservations exceeding stock during oversell windows.
    #[must_use]
    pub const fn sellable_quantity(&self) -> i64 {
        let sellable = self.quantity - self.reserved_quantity;
        if sellable < 0 { 0 } else { sellable }
    }

    /// Whether sellable quantity has dropped to or below `threshold`.
    #[must_use]
    pub const fn needs_reorder(&self, threshold: i64) -> bool {
        self.sellable_quantity() <= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(quantity: i64, reserved: i64) -> CanonicalInventory {
        let mut inv = CanonicalInventory::new(Platform::Amazon, "TIDE-001");
        inv.quantity = quantity;
        inv.reserved_quantity = reserved;
        inv
    }

    #[test]
    fn test_sellable_quantity() {
        assert_eq!(snapshot(8, 3).sellable_quantity(), 5);
    }

    #[test]
    fn test_sellable_quantity_never_negative() {
        // Reservations exceeding stock clamp to zero
        assert_eq!(snapshot(2, 7).sellable_quantity(), 0);
    }

    #[test]
    fn test_needs_reorder() {
        assert!(snapshot(8, 3).needs_reorder(10));
        assert!(!snapshot(50, 3).needs_reorder(10));
    }
}
