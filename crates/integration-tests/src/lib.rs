//! Integration tests for Tidemark.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tidemark-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `webhook_ingestion` - End-to-end webhook endpoint behavior
//! - `transport_retry` - Rate-limit retry semantics against a stub server
//! - `adapter_capabilities` - Declared capability gaps across adapters
//!
//! Tests spawn the webhook service on an ephemeral local port and drive it
//! with a real HTTP client; no external services are required.

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;
use tidemark_webhooks::config::WebhooksConfig;
use tidemark_webhooks::processor::EventProcessor;
use tidemark_webhooks::state::AppState;
use tidemark_webhooks::store::MemoryStore;

/// Shared secret the test config assigns to every platform.
pub const TEST_SECRET: &str = "tidemark-test-webhook-secret";

/// Webhook config with every platform secret set to [`TEST_SECRET`].
#[must_use]
pub fn test_config() -> WebhooksConfig {
    WebhooksConfig {
        host: "127.0.0.1".parse().expect("loopback"),
        port: 0,
        amazon_secret: Some(SecretString::from(TEST_SECRET)),
        bigcommerce_secret: Some(SecretString::from(TEST_SECRET)),
        woocommerce_secret: Some(SecretString::from(TEST_SECRET)),
        ebay_secret: None,
    }
}

/// A running webhook service bound to an ephemeral port.
pub struct TestServer {
    /// Base URL of the spawned service.
    pub base_url: String,
    /// The store backing the service, for assertions.
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    /// Spawn the service with the default no-op processor.
    pub async fn spawn() -> Self {
        Self::spawn_with_processor(Arc::new(
            tidemark_webhooks::processor::NoopProcessor,
        ))
        .await
    }

    /// Spawn the service with a custom downstream processor.
    pub async fn spawn_with_processor(processor: Arc<dyn EventProcessor>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::with_backends(
            test_config(),
            store.clone(),
            store.clone(),
            processor,
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr: SocketAddr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, tidemark_webhooks::app(state))
                .await
                .expect("serve");
        });

        Self {
            base_url: format!("http://{addr}"),
            store,
        }
    }
}
