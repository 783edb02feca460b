//! End-to-end webhook endpoint behavior.

use std::sync::Arc;

use async_trait::async_trait;
use tidemark_adapters::signature::hmac_base64;
use tidemark_core::{ComplianceStatus, WebhookEventStatus, WebhookTopic};
use tidemark_integration_tests::{TEST_SECRET, TestServer};
use tidemark_webhooks::processor::{EventProcessor, ProcessingError};

/// The limiter keys on forwarded headers; every request must carry one.
const CLIENT_IP: &str = "203.0.113.9";

fn sign(body: &[u8]) -> String {
    hmac_base64(TEST_SECRET.as_bytes(), body)
}

async fn post(
    server: &TestServer,
    platform: &str,
    signature_header: &str,
    body: &'static [u8],
    signature: Option<String>,
) -> reqwest::Response {
    let mut request = reqwest::Client::new()
        .post(format!("{}/webhooks/{platform}", server.base_url))
        .header("x-forwarded-for", CLIENT_IP)
        .header("content-type", "application/json")
        .body(body);
    if let Some(signature) = signature {
        request = request.header(signature_header, signature);
    }
    request.send().await.expect("request")
}

#[tokio::test]
async fn test_valid_signature_accepted_and_event_stored() {
    let server = TestServer::spawn().await;
    let body = br#"{"scope":"store/order/created","data":{"id":118}}"#;

    let response = post(
        &server,
        "bigcommerce",
        "x-bc-signature",
        body,
        Some(sign(body)),
    )
    .await;

    assert_eq!(response.status(), 200);
    let ack: serde_json::Value = response.json().await.expect("ack json");
    assert_eq!(ack["message"], "received");
    assert!(ack["request_id"].is_string());

    let events = server.store.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].topic, WebhookTopic::OrderCreated);
    assert_eq!(events[0].resource_id.as_deref(), Some("118"));
    assert_eq!(events[0].status, WebhookEventStatus::Processed);
}

#[tokio::test]
async fn test_flipped_byte_rejected() {
    let server = TestServer::spawn().await;
    let signed = br#"{"customer_id":42}"#;
    let tampered: &'static [u8] = br#"{"customer_id":43}"#;

    let response = post(
        &server,
        "woocommerce",
        "x-wc-webhook-signature",
        tampered,
        Some(sign(signed)),
    )
    .await;

    assert_eq!(response.status(), 401);
    assert!(server.store.events().await.is_empty());
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let server = TestServer::spawn().await;
    let body = br#"{"customer_id":42}"#;
    let wrong = hmac_base64(b"some-other-secret", body);

    let response = post(&server, "woocommerce", "x-wc-webhook-signature", body, Some(wrong)).await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_missing_signature_header_rejected() {
    let server = TestServer::spawn().await;

    let response = post(
        &server,
        "amazon",
        "x-amz-signature",
        br#"{"notificationType":"ORDER_CHANGE"}"#,
        None,
    )
    .await;

    assert_eq!(response.status(), 401);
    assert!(server.store.events().await.is_empty());
}

#[tokio::test]
async fn test_unconfigured_platform_secret_rejected() {
    // The test config leaves eBay without a secret
    let server = TestServer::spawn().await;
    let body = br#"{"metadata":{"topic":"ITEM_AVAILABILITY"}}"#;

    let response = post(&server, "ebay", "x-ebay-signature", body, Some(sign(body))).await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_unknown_platform_is_404() {
    let server = TestServer::spawn().await;
    let body = br"{}";

    let response = post(&server, "shopify", "x-shopify-hmac", body, Some(sign(body))).await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let server = TestServer::spawn().await;

    let response = reqwest::Client::new()
        .get(format!("{}/webhooks/woocommerce", server.base_url))
        .header("x-forwarded-for", CLIENT_IP)
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 405);
}

#[tokio::test]
async fn test_malformed_json_after_verification_still_acknowledged() {
    let server = TestServer::spawn().await;
    let body: &'static [u8] = b"not json at all {";

    let response = post(
        &server,
        "woocommerce",
        "x-wc-webhook-signature",
        body,
        Some(sign(body)),
    )
    .await;

    // Verified but unparseable: 200 so the platform does not retry-storm
    assert_eq!(response.status(), 200);
    assert!(server.store.events().await.is_empty());
}

/// Processor that fails every event.
struct FailingProcessor;

#[async_trait]
impl EventProcessor for FailingProcessor {
    async fn process(
        &self,
        _event: &tidemark_core::CanonicalWebhookEvent,
    ) -> Result<(), ProcessingError> {
        Err(ProcessingError("sync pipeline unavailable".to_string()))
    }
}

#[tokio::test]
async fn test_processing_failure_recorded_but_acknowledged() {
    let server = TestServer::spawn_with_processor(Arc::new(FailingProcessor)).await;
    let body = br#"{"scope":"store/order/created","data":{"id":7}}"#;

    let response = post(
        &server,
        "bigcommerce",
        "x-bc-signature",
        body,
        Some(sign(body)),
    )
    .await;

    // Internal failure never bounces the delivery
    assert_eq!(response.status(), 200);

    let events = server.store.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, WebhookEventStatus::Failed);
    assert_eq!(
        events[0].error.as_deref(),
        Some("Processing failed: sync pipeline unavailable")
    );
}

#[tokio::test]
async fn test_compliance_record_survives_processing_failure() {
    use tidemark_webhooks::store::ComplianceStore as _;

    let server = TestServer::spawn_with_processor(Arc::new(FailingProcessor)).await;
    let body =
        br#"{"scope":"store/customer/data_request","shop_domain":"store-abc123","customer":{"id":42,"email":"buyer@example.com"}}"#;

    let response = post(
        &server,
        "bigcommerce",
        "x-bc-signature",
        body,
        Some(sign(body)),
    )
    .await;

    assert_eq!(response.status(), 200);

    // The audit record exists despite the processing failure
    let records = server.store.list_records().await.expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].topic, WebhookTopic::CustomerDataRequest);
    assert_eq!(records[0].customer_id.as_deref(), Some("42"));
    assert_eq!(records[0].shop_domain.as_deref(), Some("store-abc123"));
    assert_eq!(records[0].status, ComplianceStatus::Failed);
}
