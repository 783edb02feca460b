//! Declared capability gaps and contract conformance across adapters.

use secrecy::SecretString;
use tidemark_adapters::amazon::AmazonAdapter;
use tidemark_adapters::bigcommerce::BigcommerceAdapter;
use tidemark_adapters::config::{
    AmazonConfig, AmazonRegion, BigcommerceConfig, EbayConfig, WoocommerceConfig,
};
use tidemark_adapters::ebay::EbayAdapter;
use tidemark_adapters::woocommerce::WoocommerceAdapter;
use tidemark_adapters::{AdapterError, Capability, PageRequest, PlatformAdapter};
use tidemark_core::Platform;

fn adapters() -> Vec<Box<dyn PlatformAdapter>> {
    vec![
        Box::new(AmazonAdapter::new(AmazonConfig {
            region: AmazonRegion::Na,
            client_id: "amzn1.application-oa2-client.test".to_string(),
            client_secret: SecretString::from("lwa-secret"),
            refresh_token: SecretString::from("Atzr|refresh"),
            seller_id: "A2SELLER123".to_string(),
            marketplace_id: "ATVPDKIKX0DER".to_string(),
            webhook_secret: SecretString::from("amz-hook"),
        })),
        Box::new(BigcommerceAdapter::new(BigcommerceConfig {
            store_hash: "abc123".to_string(),
            access_token: SecretString::from("bc-token"),
            client_id: "bc-client".to_string(),
            client_secret: SecretString::from("bc-secret"),
            webhook_secret: SecretString::from("bc-hook"),
        })),
        Box::new(WoocommerceAdapter::new(WoocommerceConfig {
            store_url: "https://shop.example.com".to_string(),
            consumer_key: "ck_test".to_string(),
            consumer_secret: SecretString::from("cs_test"),
            webhook_secret: SecretString::from("wc-hook"),
        })),
        Box::new(EbayAdapter::new(EbayConfig {
            client_id: "TidemarkA-app-PRD-1".to_string(),
            client_secret: SecretString::from("cert-secret"),
            ru_name: "Tidemark-app-cb".to_string(),
            refresh_token: None,
            webhook_secret: SecretString::from("ebay-hook"),
        })),
    ]
}

#[test]
fn test_marketplaces_without_customer_apis_declare_the_gap() {
    for adapter in adapters() {
        let has_customers = adapter.capabilities().contains(Capability::Customers);
        match adapter.platform() {
            Platform::Amazon | Platform::Ebay => {
                assert!(
                    !has_customers,
                    "{} must not advertise customer access",
                    adapter.platform()
                );
            }
            Platform::Bigcommerce | Platform::Woocommerce => {
                assert!(has_customers);
            }
        }
    }
}

#[tokio::test]
async fn test_customer_calls_fail_loudly_never_empty() {
    for adapter in adapters() {
        if adapter.capabilities().contains(Capability::Customers) {
            continue;
        }

        let err = adapter
            .list_customers(PageRequest::first())
            .await
            .expect_err("capability gap must surface as an error, not an empty list");
        assert!(
            matches!(err, AdapterError::UnsupportedOperation { .. }),
            "{}: expected UnsupportedOperation, got {err:?}",
            adapter.platform()
        );
    }
}

#[test]
fn test_every_adapter_signs_and_verifies_webhooks() {
    let body = br#"{"customer_id":42}"#;
    let secrets = ["amz-hook", "bc-hook", "wc-hook", "ebay-hook"];

    for (adapter, secret) in adapters().iter().zip(secrets) {
        let signature = tidemark_adapters::signature::hmac_base64(secret.as_bytes(), body);
        assert!(
            adapter.verify_webhook_signature(body, &signature).is_ok(),
            "{}: valid signature rejected",
            adapter.platform()
        );
        // Signed under a different secret must fail
        let foreign = tidemark_adapters::signature::hmac_base64(b"other-secret", body);
        assert!(
            adapter.verify_webhook_signature(body, &foreign).is_err(),
            "{}: foreign signature accepted",
            adapter.platform()
        );
    }
}

#[test]
fn test_oauth_platforms_embed_the_csrf_state() {
    for adapter in adapters() {
        let result = adapter.auth_url("https://app.tidemark.dev/callback", "csrf-token-1");
        match adapter.platform() {
            // Key-pair platform: the flow itself is a declared gap
            Platform::Woocommerce => {
                assert!(matches!(
                    result,
                    Err(AdapterError::UnsupportedOperation { .. })
                ));
            }
            _ => {
                let url = result.expect("authorization url");
                assert!(
                    url.contains("state=csrf-token-1"),
                    "{}: state token missing from {url}",
                    adapter.platform()
                );
            }
        }
    }
}
