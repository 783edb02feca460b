//! Normalization of verified platform payloads into canonical events.
//!
//! Each platform announces the event kind differently - a header, a body
//! field, or a notification type - and names topics in its own vocabulary.
//! Translation is a pure function of the request; topics outside the shared
//! vocabulary survive as `Unknown` with the platform string preserved.

use axum::http::HeaderMap;
use chrono::Utc;
use tidemark_core::{
    CanonicalWebhookEvent, ComplianceRecord, ComplianceStatus, Platform, WebhookEventStatus,
    WebhookTopic,
};

// =============================================================================
// Signature Headers
// =============================================================================

/// The header each platform carries its HMAC signature in.
#[must_use]
pub const fn signature_header(platform: Platform) -> &'static str {
    match platform {
        Platform::Amazon => "x-amz-signature",
        Platform::Bigcommerce => "x-bc-signature",
        Platform::Woocommerce => "x-wc-webhook-signature",
        Platform::Ebay => "x-ebay-signature",
    }
}

// =============================================================================
// Topic Translation
// =============================================================================

/// Translate a platform topic string into the canonical vocabulary.
#[must_use]
pub fn translate_topic(platform: Platform, raw: &str) -> WebhookTopic {
    let known = match platform {
        Platform::Amazon => match raw {
            "ORDER_CHANGE" => Some(WebhookTopic::OrderUpdated),
            "FBA_INVENTORY_AVAILABILITY_CHANGES" => Some(WebhookTopic::InventoryUpdated),
            "LISTINGS_ITEM_STATUS_CHANGE" => Some(WebhookTopic::ProductUpdated),
            "DATA_DELETION" => Some(WebhookTopic::CustomerRedact),
            _ => None,
        },
        Platform::Bigcommerce => match raw {
            "store/order/created" => Some(WebhookTopic::OrderCreated),
            "store/order/updated" => Some(WebhookTopic::OrderUpdated),
            "store/product/created" => Some(WebhookTopic::ProductCreated),
            "store/product/updated" => Some(WebhookTopic::ProductUpdated),
            "store/product/deleted" => Some(WebhookTopic::ProductDeleted),
            "store/sku/inventory/updated" => Some(WebhookTopic::InventoryUpdated),
            "store/customer/created" => Some(WebhookTopic::CustomerCreated),
            "store/customer/data_request" => Some(WebhookTopic::CustomerDataRequest),
            "store/customer/deleted" => Some(WebhookTopic::CustomerRedact),
            "store/app/uninstalled" => Some(WebhookTopic::ShopRedact),
            _ => None,
        },
        Platform::Woocommerce => match raw {
            "order.created" => Some(WebhookTopic::OrderCreated),
            "order.updated" => Some(WebhookTopic::OrderUpdated),
            "product.created" => Some(WebhookTopic::ProductCreated),
            "product.updated" => Some(WebhookTopic::ProductUpdated),
            "product.deleted" => Some(WebhookTopic::ProductDeleted),
            "customer.created" => Some(WebhookTopic::CustomerCreated),
            "customer.deleted" => Some(WebhookTopic::CustomerRedact),
            _ => None,
        },
        Platform::Ebay => match raw {
            "MARKETPLACE_ACCOUNT_DELETION" => Some(WebhookTopic::CustomerRedact),
            "ITEM_AVAILABILITY" => Some(WebhookTopic::InventoryUpdated),
            "ITEM_PRICE_REVISION" => Some(WebhookTopic::ProductUpdated),
            _ => None,
        },
    };

    known.unwrap_or_else(|| WebhookTopic::Unknown(raw.to_string()))
}

/// Extract the raw topic string from wherever the platform put it.
#[must_use]
pub fn raw_topic(platform: Platform, headers: &HeaderMap, payload: &serde_json::Value) -> String {
    let from_headers = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let found = match platform {
        // SP-API notifications carry the type in the envelope
        Platform::Amazon => payload
            .get("notificationType")
            .and_then(|v| v.as_str())
            .map(ToString::to_string),
        // BigCommerce puts the scope in the body
        Platform::Bigcommerce => payload
            .get("scope")
            .and_then(|v| v.as_str())
            .map(ToString::to_string),
        // WooCommerce announces the topic in a delivery header
        Platform::Woocommerce => from_headers("x-wc-webhook-topic"),
        // eBay nests it under the notification metadata
        Platform::Ebay => payload
            .pointer("/metadata/topic")
            .and_then(|v| v.as_str())
            .map(ToString::to_string),
    };

    found.unwrap_or_default()
}

// =============================================================================
// Resource Extraction
// =============================================================================

/// Best-effort platform-native ID of the affected resource.
#[must_use]
pub fn resource_id(platform: Platform, payload: &serde_json::Value) -> Option<String> {
    let candidates: &[&str] = match platform {
        Platform::Amazon => &[
            "/payload/orderChangeNotification/amazonOrderId",
            "/payload/sellerSku",
            "/payload/asin",
        ],
        Platform::Bigcommerce => &["/data/id", "/data/entity_id"],
        Platform::Woocommerce => &["/id"],
        Platform::Ebay => &["/notification/data/username", "/notification/data/sku"],
    };

    candidates.iter().find_map(|pointer| {
        let value = payload.pointer(pointer)?;
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}

/// Kind of resource a topic refers to.
#[must_use]
pub fn resource_type(topic: &WebhookTopic) -> Option<&'static str> {
    match topic {
        WebhookTopic::OrderCreated | WebhookTopic::OrderUpdated => Some("order"),
        WebhookTopic::ProductCreated
        | WebhookTopic::ProductUpdated
        | WebhookTopic::ProductDeleted => Some("product"),
        WebhookTopic::InventoryUpdated => Some("inventory"),
        WebhookTopic::CustomerCreated
        | WebhookTopic::CustomerDataRequest
        | WebhookTopic::CustomerRedact => Some("customer"),
        WebhookTopic::ShopRedact => Some("shop"),
        WebhookTopic::Unknown(_) => None,
    }
}

// =============================================================================
// Event Construction
// =============================================================================

/// Build a canonical event from a verified, parsed delivery.
#[must_use]
pub fn build_event(
    platform: Platform,
    headers: &HeaderMap,
    payload: serde_json::Value,
) -> CanonicalWebhookEvent {
    let topic = translate_topic(platform, &raw_topic(platform, headers, &payload));

    CanonicalWebhookEvent {
        id: uuid::Uuid::new_v4().to_string(),
        platform,
        resource_id: resource_id(platform, &payload),
        resource_type: resource_type(&topic).map(ToString::to_string),
        topic,
        payload,
        status: WebhookEventStatus::Pending,
        error: None,
        received_at: Utc::now(),
    }
}

/// Build the audit record for a compliance-topic event.
///
/// Identity fields are best-effort extractions; the record is persisted
/// even when they are absent, because the audit obligation attaches to the
/// request itself.
#[must_use]
pub fn build_compliance_record(event: &CanonicalWebhookEvent) -> ComplianceRecord {
    let payload = &event.payload;
    let string_at = |pointers: &[&str]| {
        pointers.iter().find_map(|pointer| {
            match payload.pointer(pointer)? {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        })
    };

    ComplianceRecord {
        id: uuid::Uuid::new_v4().to_string(),
        platform: event.platform,
        topic: event.topic.clone(),
        shop_domain: string_at(&["/shop_domain", "/store_hash", "/producer", "/shop"]),
        customer_id: string_at(&[
            "/customer/id",
            "/customer_id",
            "/data/id",
            "/notification/data/userId",
        ]),
        customer_email: string_at(&["/customer/email", "/email"]),
        received_at: event.received_at,
        status: ComplianceStatus::Pending,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_headers() {
        assert_eq!(
            signature_header(Platform::Woocommerce),
            "x-wc-webhook-signature"
        );
        assert_eq!(signature_header(Platform::Bigcommerce), "x-bc-signature");
    }

    #[test]
    fn test_topic_translation_round_trip() {
        assert_eq!(
            translate_topic(Platform::Bigcommerce, "store/order/created"),
            WebhookTopic::OrderCreated
        );
        assert_eq!(
            translate_topic(Platform::Woocommerce, "order.created"),
            WebhookTopic::OrderCreated
        );
        assert_eq!(
            translate_topic(Platform::Ebay, "MARKETPLACE_ACCOUNT_DELETION"),
            WebhookTopic::CustomerRedact
        );
    }

    #[test]
    fn test_unknown_topic_preserves_platform_string() {
        let topic = translate_topic(Platform::Bigcommerce, "store/cart/abandoned");
        assert_eq!(
            topic,
            WebhookTopic::Unknown("store/cart/abandoned".to_string())
        );
        assert!(!topic.is_compliance());
    }

    #[test]
    fn test_raw_topic_extraction_per_platform() {
        let mut headers = HeaderMap::new();
        headers.insert("x-wc-webhook-topic", "order.updated".parse().expect("value"));
        assert_eq!(
            raw_topic(Platform::Woocommerce, &headers, &serde_json::json!({})),
            "order.updated"
        );

        let payload = serde_json::json!({"scope": "store/product/updated", "data": {"id": 9}});
        assert_eq!(
            raw_topic(Platform::Bigcommerce, &HeaderMap::new(), &payload),
            "store/product/updated"
        );
        assert_eq!(
            resource_id(Platform::Bigcommerce, &payload).as_deref(),
            Some("9")
        );
    }

    #[test]
    fn test_build_event_is_pending() {
        let payload = serde_json::json!({"scope": "store/order/created", "data": {"id": 118}});
        let event = build_event(Platform::Bigcommerce, &HeaderMap::new(), payload);
        assert_eq!(event.topic, WebhookTopic::OrderCreated);
        assert_eq!(event.status, WebhookEventStatus::Pending);
        assert_eq!(event.resource_id.as_deref(), Some("118"));
        assert_eq!(event.resource_type.as_deref(), Some("order"));
    }

    #[test]
    fn test_compliance_record_extraction() {
        let payload = serde_json::json!({
            "shop_domain": "store-abc123.mybigcommerce.com",
            "customer": {"id": 42, "email": "buyer@example.com"},
        });
        let mut event = build_event(Platform::Bigcommerce, &HeaderMap::new(), payload);
        event.topic = WebhookTopic::CustomerDataRequest;

        let record = build_compliance_record(&event);
        assert_eq!(
            record.shop_domain.as_deref(),
            Some("store-abc123.mybigcommerce.com")
        );
        assert_eq!(record.customer_id.as_deref(), Some("42"));
        assert_eq!(record.customer_email.as_deref(), Some("buyer@example.com"));
        assert_eq!(record.status, ComplianceStatus::Pending);
    }
}
