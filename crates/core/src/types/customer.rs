//! Customer domain types and segmentation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CanonicalAddress, Platform};

// =============================================================================
// Segmentation
// =============================================================================

/// Spend-based customer segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    /// Lifetime spend at or above the VIP threshold.
    Vip,
    /// Lifetime spend at or above the high-value threshold.
    HighValue,
    /// Lifetime spend at or above the regular threshold.
    Regular,
    /// Everyone else.
    New,
}

/// Segment thresholds in the store currency.
///
/// The defaults (1000 / 500 / 100) are policy, not platform data; callers
/// may override them per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentThresholds {
    /// Minimum lifetime spend for [`CustomerSegment::Vip`].
    pub vip: Decimal,
    /// Minimum lifetime spend for [`CustomerSegment::HighValue`].
    pub high_value: Decimal,
    /// Minimum lifetime spend for [`CustomerSegment::Regular`].
    pub regular: Decimal,
}

impl Default for SegmentThresholds {
    fn default() -> Self {
        Self {
            vip: Decimal::from(1000),
            high_value: Decimal::from(500),
            regular: Decimal::from(100),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer in the canonical model.
///
/// Aggregated stats (`orders_count`, `total_spent`) may be platform-reported
/// or locally computed; derived values are calculated from whatever is
/// present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCustomer {
    /// Source platform.
    pub platform: Platform,
    /// Platform-native customer ID.
    #[serde(default)]
    pub platform_id: String,
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
    /// Total orders placed.
    #[serde(default)]
    pub orders_count: i64,
    /// Lifetime spend.
    #[serde(default)]
    pub total_spent: Decimal,
    /// Default address.
    #[serde(default)]
    pub default_address: Option<CanonicalAddress>,
    /// Alternate addresses.
    #[serde(default)]
    pub addresses: Vec<CanonicalAddress>,
    /// Marketing consent flag.
    #[serde(default)]
    pub accepts_marketing: bool,
    /// When the platform created the customer record.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the platform last updated the customer record.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CanonicalCustomer {
    /// Create an empty customer with the given identity and defaults for
    /// every other field.
    #[must_use]
    pub fn new(platform: Platform, platform_id: impl Into<String>) -> Self {
        Self {
            platform,
            platform_id: platform_id.into(),
            email: None,
            first_name: None,
            last_name: None,
            phone: None,
            orders_count: 0,
            total_spent: Decimal::ZERO,
            default_address: None,
            addresses: Vec::new(),
            accepts_marketing: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Average order value, `None` for customers with no orders.
    #[must_use]
    pub fn average_order_value(&self) -> Option<Decimal> {
        if self.orders_count <= 0 {
            return None;
        }
        Some(self.total_spent / Decimal::from(self.orders_count))
    }

    /// Lifetime value: total spend to date.
    #[must_use]
    pub const fn lifetime_value(&self) -> Decimal {
        self.total_spent
    }

    /// Segment this customer by lifetime spend.
    #[must_use]
    pub fn segment(&self, thresholds: &SegmentThresholds) -> CustomerSegment {
        if self.total_spent >= thresholds.vip {
            CustomerSegment::Vip
        } else if self.total_spent >= thresholds.high_value {
            CustomerSegment::HighValue
        } else if self.total_spent >= thresholds.regular {
            CustomerSegment::Regular
        } else {
            CustomerSegment::New
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(spent: &str, orders: i64) -> CanonicalCustomer {
        let mut c = CanonicalCustomer::new(Platform::Bigcommerce, "42");
        c.total_spent = spent.parse().expect("decimal");
        c.orders_count = orders;
        c
    }

    #[test]
    fn test_segments() {
        let thresholds = SegmentThresholds::default();
        assert_eq!(
            customer("1000.00", 10).segment(&thresholds),
            CustomerSegment::Vip
        );
        assert_eq!(
            customer("999.99", 9).segment(&thresholds),
            CustomerSegment::HighValue
        );
        assert_eq!(
            customer("150.00", 2).segment(&thresholds),
            CustomerSegment::Regular
        );
        assert_eq!(
            customer("99.99", 1).segment(&thresholds),
            CustomerSegment::New
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = SegmentThresholds {
            vip: Decimal::from(100),
            high_value: Decimal::from(50),
            regular: Decimal::from(10),
        };
        assert_eq!(
            customer("120.00", 3).segment(&thresholds),
            CustomerSegment::Vip
        );
    }

    #[test]
    fn test_average_order_value() {
        let aov = customer("300.00", 4).average_order_value().expect("aov");
        assert_eq!(aov, "75".parse::<Decimal>().expect("decimal"));
        assert!(customer("0", 0).average_order_value().is_none());
    }
}
