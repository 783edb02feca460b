//! WooCommerce REST API adapter.
//!
//! # Architecture
//!
//! - Pre-provisioned consumer key/secret pair sent as HTTP Basic auth; the
//!   OAuth-code operations are a declared gap on this platform
//! - `page`/`per_page` pagination, stopping on a short page
//! - Variable products enriched with their variations through a bounded
//!   worker pool

mod conversions;
mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use secrecy::ExposeSecret;
use tidemark_core::{
    CanonicalCustomer, CanonicalInventory, CanonicalOrder, CanonicalProduct, ConnectionState,
    FulfillmentStatus, Platform, WebhookTopic,
};
use tracing::instrument;

use crate::config::WoocommerceConfig;
use crate::contract::{
    CapabilitySet, ConnectionInfo, DETAIL_FETCH_CONCURRENCY, FulfillmentRequest, OrderQuery,
    Page, PageRequest, PlatformAdapter, TokenResponse,
};
use crate::error::AdapterError;
use crate::signature::verify_hmac_base64;
use crate::transport::Transport;

use conversions::{convert_customer, convert_inventory, convert_order, convert_product};
use types::{WcCustomer, WcOrder, WcProduct, WcSystemStatus, WcVariation, WcWebhook};

/// WooCommerce sites rarely send `Retry-After`; hosts throttle in short
/// bursts.
const MIN_RETRY_DELAY: Duration = Duration::from_secs(10);

/// WooCommerce REST API adapter.
#[derive(Clone)]
pub struct WoocommerceAdapter {
    inner: Arc<WoocommerceAdapterInner>,
}

struct WoocommerceAdapterInner {
    config: WoocommerceConfig,
    transport: Transport,
}

impl WoocommerceAdapter {
    /// Create an adapter from configuration.
    #[must_use]
    pub fn new(config: WoocommerceConfig) -> Self {
        Self {
            inner: Arc::new(WoocommerceAdapterInner {
                config,
                transport: Transport::new(Platform::Woocommerce, MIN_RETRY_DELAY),
            }),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/wp-json/wc/v3{path}", self.inner.config.store_url)
    }

    /// Build a request with the key pair as Basic auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .transport
            .client()
            .request(method, self.api_url(path))
            .basic_auth(
                &self.inner.config.consumer_key,
                Some(self.inner.config.consumer_secret.expose_secret()),
            )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AdapterError> {
        let request = self.request(reqwest::Method::GET, path).query(query);
        let response = self.inner.transport.execute(request).await?;
        response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("{path}: {e}")))
    }

    fn page_number(cursor: Option<&str>) -> u32 {
        cursor.and_then(|c| c.parse().ok()).unwrap_or(1)
    }

    /// Fetch every variation of a variable product, in page order.
    async fn fetch_variations(&self, product_id: i64) -> Result<Vec<WcVariation>, AdapterError> {
        let mut variations = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<WcVariation> = self
                .get_json(
                    &format!("/products/{product_id}/variations"),
                    &[("page", page.to_string()), ("per_page", "100".to_string())],
                )
                .await?;
            let short_page = batch.len() < 100;
            variations.extend(batch);
            if short_page {
                return Ok(variations);
            }
            page += 1;
        }
    }

    /// Enrich variable products with their variations; simple products pass
    /// through with an empty list.
    async fn with_variations(
        &self,
        products: Vec<WcProduct>,
    ) -> Result<Vec<(WcProduct, Vec<WcVariation>)>, AdapterError> {
        let enriched: Vec<Result<(WcProduct, Vec<WcVariation>), AdapterError>> =
            futures::stream::iter(products.into_iter().map(|product| {
                let adapter = self.clone();
                async move {
                    let variable = product.product_type.as_deref() == Some("variable");
                    if !variable || product.variations.is_empty() {
                        return Ok((product, Vec::new()));
                    }
                    let variations = adapter.fetch_variations(product.id).await?;
                    Ok((product, variations))
                }
            }))
            .buffered(DETAIL_FETCH_CONCURRENCY)
            .collect()
            .await;

        enriched.into_iter().collect()
    }

    /// Resolve a SKU to its product ID.
    async fn product_id_for_sku(&self, sku: &str) -> Result<i64, AdapterError> {
        let matches: Vec<WcProduct> = self
            .get_json("/products", &[("sku", sku.to_string())])
            .await?;

        matches
            .first()
            .map(|p| p.id)
            .ok_or_else(|| AdapterError::PlatformApi {
                status: 404,
                message: format!("no product with SKU {sku}"),
            })
    }

    /// Translate a canonical topic to a WooCommerce webhook topic.
    fn webhook_topic(topic: &WebhookTopic) -> Result<&'static str, AdapterError> {
        match topic {
            WebhookTopic::OrderCreated => Ok("order.created"),
            WebhookTopic::OrderUpdated => Ok("order.updated"),
            WebhookTopic::ProductCreated => Ok("product.created"),
            WebhookTopic::ProductUpdated | WebhookTopic::InventoryUpdated => {
                Ok("product.updated")
            }
            WebhookTopic::ProductDeleted => Ok("product.deleted"),
            WebhookTopic::CustomerCreated => Ok("customer.created"),
            _ => Err(AdapterError::unsupported(
                Platform::Woocommerce,
                "webhooks for this topic",
            )),
        }
    }

    /// Map a canonical fulfillment transition onto an order status slug.
    const fn status_slug_for(status: FulfillmentStatus) -> &'static str {
        match status {
            FulfillmentStatus::Fulfilled => "completed",
            // No partial-shipment state; keep the order in processing
            FulfillmentStatus::Partial | FulfillmentStatus::Unfulfilled => "processing",
            FulfillmentStatus::Cancelled => "cancelled",
        }
    }
}

#[async_trait]
impl PlatformAdapter for WoocommerceAdapter {
    fn platform(&self) -> Platform {
        Platform::Woocommerce
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::all()
    }

    // -------------------------------------------------------------------------
    // Connection / Auth
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn test_connection(&self) -> Result<ConnectionInfo, AdapterError> {
        let status: WcSystemStatus = self.get_json("/system_status", &[]).await?;

        Ok(ConnectionInfo {
            platform: Platform::Woocommerce,
            account: status
                .environment
                .and_then(|e| e.site_url)
                .or_else(|| Some(self.inner.config.store_url.clone())),
            state: ConnectionState::Connected,
        })
    }

    /// WooCommerce authenticates with a pre-provisioned key pair; there is
    /// no authorization-code flow to build a URL for.
    fn auth_url(&self, _redirect_uri: &str, _state: &str) -> Result<String, AdapterError> {
        Err(AdapterError::unsupported(
            Platform::Woocommerce,
            "authorization-code OAuth",
        ))
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenResponse, AdapterError> {
        Err(AdapterError::unsupported(
            Platform::Woocommerce,
            "authorization-code OAuth",
        ))
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_products(
        &self,
        page: PageRequest,
    ) -> Result<Page<CanonicalProduct>, AdapterError> {
        let current = Self::page_number(page.cursor.as_deref());
        let products: Vec<WcProduct> = self
            .get_json(
                "/products",
                &[
                    ("page", current.to_string()),
                    ("per_page", page.limit.to_string()),
                ],
            )
            .await?;

        let full_page = products.len() as u32 >= page.limit;
        let enriched = self.with_variations(products).await?;

        Ok(Page {
            items: enriched
                .iter()
                .map(|(product, variations)| convert_product(product, variations))
                .collect(),
            next_cursor: full_page.then(|| (current + 1).to_string()),
        })
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: &str) -> Result<CanonicalProduct, AdapterError> {
        let product: WcProduct = self.get_json(&format!("/products/{id}"), &[]).await?;
        let variations = if product.variations.is_empty() {
            Vec::new()
        } else {
            self.fetch_variations(product.id).await?
        };

        Ok(convert_product(&product, &variations))
    }

    #[instrument(skip(self, product))]
    async fn create_product(&self, product: &CanonicalProduct) -> Result<String, AdapterError> {
        let body = conversions::product_create_payload(product);
        let request = self.request(reqwest::Method::POST, "/products").json(&body);
        let response = self.inner.transport.execute(request).await?;
        let created: WcProduct = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("products: {e}")))?;

        Ok(created.id.to_string())
    }

    #[instrument(skip(self, product))]
    async fn update_product(
        &self,
        id: &str,
        product: &CanonicalProduct,
    ) -> Result<(), AdapterError> {
        let body = conversions::product_update_payload(product);
        let request = self
            .request(reqwest::Method::PUT, &format!("/products/{id}"))
            .json(&body);
        self.inner.transport.execute(request).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: &str) -> Result<(), AdapterError> {
        let request = self
            .request(reqwest::Method::DELETE, &format!("/products/{id}"))
            .query(&[("force", "true")]);
        self.inner.transport.execute(request).await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Inventory
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_inventory(
        &self,
        page: PageRequest,
    ) -> Result<Page<CanonicalInventory>, AdapterError> {
        let current = Self::page_number(page.cursor.as_deref());
        let products: Vec<WcProduct> = self
            .get_json(
                "/products",
                &[
                    ("page", current.to_string()),
                    ("per_page", page.limit.to_string()),
                ],
            )
            .await?;

        let full_page = products.len() as u32 >= page.limit;
        let enriched = self.with_variations(products).await?;

        Ok(Page {
            items: enriched
                .iter()
                .flat_map(|(product, variations)| convert_inventory(product, variations))
                .collect(),
            next_cursor: full_page.then(|| (current + 1).to_string()),
        })
    }

    #[instrument(skip(self))]
    async fn set_inventory_quantity(
        &self,
        sku: &str,
        quantity: i64,
    ) -> Result<(), AdapterError> {
        let product_id = self.product_id_for_sku(sku).await?;
        let body = serde_json::json!({
            "manage_stock": true,
            "stock_quantity": quantity.max(0),
        });

        let request = self
            .request(reqwest::Method::PUT, &format!("/products/{product_id}"))
            .json(&body);
        self.inner.transport.execute(request).await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_orders(&self, query: OrderQuery) -> Result<Page<CanonicalOrder>, AdapterError> {
        let current = Self::page_number(query.page.cursor.as_deref());
        let mut params = vec![
            ("page", current.to_string()),
            ("per_page", query.page.limit.to_string()),
            ("orderby", "modified".to_string()),
            ("order", "asc".to_string()),
        ];
        if let Some(updated_after) = query.updated_after {
            params.push(("modified_after", updated_after.to_rfc3339()));
        }

        let orders: Vec<WcOrder> = self.get_json("/orders", &params).await?;
        let full_page = orders.len() as u32 >= query.page.limit;

        Ok(Page {
            items: orders
                .iter()
                .map(|order| convert_order(order, &self.inner.config.store_url))
                .collect(),
            next_cursor: full_page.then(|| (current + 1).to_string()),
        })
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: &str) -> Result<CanonicalOrder, AdapterError> {
        let order: WcOrder = self.get_json(&format!("/orders/{id}"), &[]).await?;
        Ok(convert_order(&order, &self.inner.config.store_url))
    }

    #[instrument(skip(self))]
    async fn update_order_status(
        &self,
        id: &str,
        status: FulfillmentStatus,
    ) -> Result<(), AdapterError> {
        let body = serde_json::json!({ "status": Self::status_slug_for(status) });
        let request = self
            .request(reqwest::Method::PUT, &format!("/orders/{id}"))
            .json(&body);
        self.inner.transport.execute(request).await?;

        Ok(())
    }

    /// Core WooCommerce has no tracking objects; completion plus tracking
    /// metadata is the established convention shipping plugins read.
    #[instrument(skip(self, fulfillment))]
    async fn fulfill_order(
        &self,
        id: &str,
        fulfillment: &FulfillmentRequest,
    ) -> Result<(), AdapterError> {
        let body = serde_json::json!({
            "status": "completed",
            "meta_data": [
                {"key": "_tracking_provider", "value": fulfillment.carrier},
                {"key": "_tracking_number", "value": fulfillment.tracking_number},
                {"key": "_tracking_url", "value": fulfillment.tracking_url},
            ],
        });

        let request = self
            .request(reqwest::Method::PUT, &format!("/orders/{id}"))
            .json(&body);
        self.inner.transport.execute(request).await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_customers(
        &self,
        page: PageRequest,
    ) -> Result<Page<CanonicalCustomer>, AdapterError> {
        let current = Self::page_number(page.cursor.as_deref());
        let customers: Vec<WcCustomer> = self
            .get_json(
                "/customers",
                &[
                    ("page", current.to_string()),
                    ("per_page", page.limit.to_string()),
                ],
            )
            .await?;

        let full_page = customers.len() as u32 >= page.limit;

        Ok(Page {
            items: customers.iter().map(convert_customer).collect(),
            next_cursor: full_page.then(|| (current + 1).to_string()),
        })
    }

    #[instrument(skip(self))]
    async fn get_customer(&self, id: &str) -> Result<CanonicalCustomer, AdapterError> {
        let customer: WcCustomer = self.get_json(&format!("/customers/{id}"), &[]).await?;
        Ok(convert_customer(&customer))
    }

    // -------------------------------------------------------------------------
    // Webhooks
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn register_webhook(
        &self,
        topic: &WebhookTopic,
        address: &str,
    ) -> Result<String, AdapterError> {
        let wc_topic = Self::webhook_topic(topic)?;
        let body = serde_json::json!({
            "name": format!("Tidemark {wc_topic}"),
            "topic": wc_topic,
            "delivery_url": address,
            "secret": self.inner.config.webhook_secret.expose_secret(),
        });

        let request = self.request(reqwest::Method::POST, "/webhooks").json(&body);
        let response = self.inner.transport.execute(request).await?;
        let created: WcWebhook = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("webhooks: {e}")))?;

        Ok(created.id.to_string())
    }

    #[instrument(skip(self))]
    async fn unregister_webhook(&self, webhook_id: &str) -> Result<(), AdapterError> {
        let request = self
            .request(reqwest::Method::DELETE, &format!("/webhooks/{webhook_id}"))
            .query(&[("force", "true")]);
        self.inner.transport.execute(request).await?;

        Ok(())
    }

    fn verify_webhook_signature(
        &self,
        raw_body: &[u8],
        signature: &str,
    ) -> Result<(), AdapterError> {
        verify_hmac_base64(
            self.inner.config.webhook_secret.expose_secret().as_bytes(),
            raw_body,
            signature,
        )
    }
}

impl std::fmt::Debug for WoocommerceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WoocommerceAdapter")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::contract::Capability;

    fn adapter() -> WoocommerceAdapter {
        WoocommerceAdapter::new(WoocommerceConfig {
            store_url: "https://shop.example.com".to_string(),
            consumer_key: "ck_test".to_string(),
            consumer_secret: SecretString::from("cs_test"),
            webhook_secret: SecretString::from("wc-hook-secret"),
        })
    }

    #[test]
    fn test_key_pair_platform_has_no_oauth_flow() {
        let adapter = adapter();
        assert!(matches!(
            adapter.auth_url("https://app.tidemark.dev/cb", "state"),
            Err(AdapterError::UnsupportedOperation { .. })
        ));
        // The capability set still advertises everything else
        assert!(adapter.capabilities().contains(Capability::Customers));
    }

    #[test]
    fn test_webhook_topic_translation() {
        assert_eq!(
            WoocommerceAdapter::webhook_topic(&WebhookTopic::OrderCreated).expect("topic"),
            "order.created"
        );
        assert!(WoocommerceAdapter::webhook_topic(&WebhookTopic::CustomerRedact).is_err());
    }

    #[test]
    fn test_status_slug_mapping() {
        assert_eq!(
            WoocommerceAdapter::status_slug_for(FulfillmentStatus::Fulfilled),
            "completed"
        );
        assert_eq!(
            WoocommerceAdapter::status_slug_for(FulfillmentStatus::Partial),
            "processing"
        );
    }

    #[test]
    fn test_signature_uses_wc_scheme() {
        let adapter = adapter();
        let body = br#"{"id":727}"#;
        let signature = crate::signature::hmac_base64(b"wc-hook-secret", body);
        assert!(adapter.verify_webhook_signature(body, &signature).is_ok());
        assert!(
            adapter
                .verify_webhook_signature(br#"{"id":728}"#, &signature)
                .is_err()
        );
    }
}
