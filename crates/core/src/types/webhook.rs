//! Canonical webhook events and compliance records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Platform;

// =============================================================================
// Topics
// =============================================================================

/// Canonical webhook topic vocabulary.
///
/// Each adapter translates its platform's own topic names to and from this
/// set; topics outside the shared vocabulary survive as `Unknown` with the
/// original platform string preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookTopic {
    /// An order was created.
    OrderCreated,
    /// An order was updated.
    OrderUpdated,
    /// A product was created.
    ProductCreated,
    /// A product was updated.
    ProductUpdated,
    /// A product was deleted.
    ProductDeleted,
    /// Inventory levels changed.
    InventoryUpdated,
    /// A customer was created.
    CustomerCreated,
    /// A customer requested a copy of their data (compliance).
    CustomerDataRequest,
    /// A customer requested erasure of their data (compliance).
    CustomerRedact,
    /// A shop requested erasure of all its data (compliance).
    ShopRedact,
    /// Platform topic with no canonical equivalent.
    #[serde(untagged)]
    Unknown(String),
}

impl WebhookTopic {
    /// Whether this topic carries a regulatory response deadline.
    ///
    /// Compliance topics must produce an auditable record independent of
    /// whether downstream processing succeeds.
    #[must_use]
    pub const fn is_compliance(&self) -> bool {
        matches!(
            self,
            Self::CustomerDataRequest | Self::CustomerRedact | Self::ShopRedact
        )
    }
}

// =============================================================================
// Events
// =============================================================================

/// Processing status of a stored webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventStatus {
    /// Received and persisted, not yet processed.
    #[default]
    Pending,
    /// Downstream processing completed.
    Processed,
    /// Downstream processing failed; see `error`.
    Failed,
}

/// A normalized inbound platform notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalWebhookEvent {
    /// Ingestion-assigned event ID (UUID).
    pub id: String,
    /// Source platform.
    pub platform: Platform,
    /// Canonical topic.
    pub topic: WebhookTopic,
    /// Platform-native ID of the affected resource, when extractable.
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Kind of resource the event refers to (e.g., "order").
    #[serde(default)]
    pub resource_type: Option<String>,
    /// Raw platform payload, verified but otherwise untouched.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Processing status.
    #[serde(default)]
    pub status: WebhookEventStatus,
    /// Processing error, populated when `status` is `Failed`.
    #[serde(default)]
    pub error: Option<String>,
    /// When the event was received.
    pub received_at: DateTime<Utc>,
}

// =============================================================================
// Compliance
// =============================================================================

/// Handling status of a compliance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Recorded, awaiting handling.
    #[default]
    Pending,
    /// Request fulfilled.
    Completed,
    /// Handling failed; the audit record survives regardless.
    Failed,
}

/// Auditable record of a customer-data compliance request.
///
/// Persisted for every compliance topic whether or not downstream processing
/// succeeds - regulatory response deadlines apply regardless of internal
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    /// Record ID (UUID).
    pub id: String,
    /// Source platform.
    pub platform: Platform,
    /// Compliance topic.
    pub topic: WebhookTopic,
    /// Requesting shop domain.
    #[serde(default)]
    pub shop_domain: Option<String>,
    /// Platform-native ID of the customer concerned.
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Email of the customer concerned.
    #[serde(default)]
    pub customer_email: Option<String>,
    /// When the request was received.
    pub received_at: DateTime<Utc>,
    /// Handling status.
    #[serde(default)]
    pub status: ComplianceStatus,
    /// Handling error, if any.
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compliance_topics() {
        assert!(WebhookTopic::CustomerDataRequest.is_compliance());
        assert!(WebhookTopic::CustomerRedact.is_compliance());
        assert!(WebhookTopic::ShopRedact.is_compliance());
        assert!(!WebhookTopic::OrderCreated.is_compliance());
        assert!(!WebhookTopic::Unknown("order/edited".to_string()).is_compliance());
    }

    #[test]
    fn test_topic_serde() {
        assert_eq!(
            serde_json::to_string(&WebhookTopic::OrderCreated).expect("serialize"),
            "\"order_created\""
        );
        // Unknown topics round-trip the raw platform string
        let topic = WebhookTopic::Unknown("store/cart/abandoned".to_string());
        let json = serde_json::to_string(&topic).expect("serialize");
        assert_eq!(json, "\"store/cart/abandoned\"");
        let back: WebhookTopic = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, topic);
    }

    #[test]
    fn test_event_status_default_pending() {
        assert_eq!(WebhookEventStatus::default(), WebhookEventStatus::Pending);
    }
}
