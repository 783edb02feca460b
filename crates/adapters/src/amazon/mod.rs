//! Amazon Selling Partner API adapter.
//!
//! # Architecture
//!
//! - Login-with-Amazon (LWA) refresh-token auth; access tokens cached with
//!   single-flight refresh
//! - Regional base URL selected by [`crate::config::AmazonRegion`]
//! - Opaque `NextToken` pagination
//! - Orders enriched with line items through a bounded worker pool
//!
//! # Capability Gaps
//!
//! Amazon exposes buyer contact data only as per-order snapshots; there is
//! no customer records API, so the `Customers` capability is absent and the
//! customer operations fail with `UnsupportedOperation`.

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

use crate::auth::{OAuthToken, TokenCache};
use crate::config::AmazonConfig;
use crate::contract::{
    Capability, CapabilitySet, ConnectionInfo, DETAIL_FETCH_CONCURRENCY, FulfillmentRequest,
    OrderQuery, Page, PageRequest, PlatformAdapter, TokenResponse, fetch_all_pages,
};
use crate::error::AdapterError;
use crate::signature::verify_hmac_base64;
use crate::transport::Transport;

use conversions::{convert_inventory, convert_order, convert_product};
use types::{
    InventorySummariesResponse, ListingsItem, ListingsSearchResponse,
    ListingsSubmissionResponse, MarketplaceParticipation, OrderItemsPayload, OrdersPayload,
    SpApiEnvelope, SpOrder, SpOrderItem, SubscriptionPayload,
};

/// LWA token endpoint (region-independent).
const LWA_TOKEN_ENDPOINT: &str = "https://api.amazon.com/auth/o2/token";

/// Seller Central OAuth consent base URL.
const CONSENT_URL: &str = "https://sellercentral.amazon.com/apps/authorize/consent";

/// SP-API rate limits often arrive without `Retry-After`.
const MIN_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Amazon Selling Partner API adapter.
#[derive(Clone)]
pub struct AmazonAdapter {
    inner: Arc<AmazonAdapterInner>,
}

struct AmazonAdapterInner {
    config: AmazonConfig,
    transport: Transport,
    tokens: TokenCache,
}

impl AmazonAdapter {
    /// Create an adapter from configuration.
    #[must_use]
    pub fn new(config: AmazonConfig) -> Self {
        Self {
            inner: Arc::new(AmazonAdapterInner {
                config,
                transport: Transport::new(Platform::Amazon, MIN_RETRY_DELAY),
                tokens: TokenCache::new(),
            }),
        }
    }

    fn base_url(&self) -> &'static str {
        self.inner.config.region.endpoint()
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Get a valid LWA access token, refreshing at most once per expiry.
    async fn access_token(&self) -> Result<OAuthToken, AdapterError> {
        self.inner
            .tokens
            .get_or_refresh(|| self.refresh_access_token())
            .await
    }

    /// Run the LWA refresh-token grant.
    #[instrument(skip(self))]
    async fn refresh_access_token(&self) -> Result<OAuthToken, AdapterError> {
        let config = &self.inner.config;
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", config.refresh_token.expose_secret()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose_secret()),
        ];

        let request = self
            .inner
            .transport
            .client()
            .post(LWA_TOKEN_ENDPOINT)
            .form(&params);
        let response = self.inner.transport.execute(request).await?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("LWA token response: {e}")))?;

        Ok(OAuthToken::from_response(
            token.access_token,
            token.refresh_token,
            token.expires_in,
        ))
    }

    // =========================================================================
    // Request Helpers
    // =========================================================================

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AdapterError> {
        let token = self.access_token().await?;
        let request = self
            .inner
            .transport
            .client()
            .get(format!("{}{path}", self.base_url()))
            .header("x-amz-access-token", token.bearer())
            .query(query);

        let response = self.inner.transport.execute(request).await?;
        response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("{path}: {e}")))
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<T, AdapterError> {
        let token = self.access_token().await?;
        let request = self
            .inner
            .transport
            .client()
            .request(method, format!("{}{path}", self.base_url()))
            .header("x-amz-access-token", token.bearer())
            .query(query)
            .json(body);

        let response = self.inner.transport.execute(request).await?;
        response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("{path}: {e}")))
    }

    /// Fetch every line item page for one order, in cursor order.
    async fn fetch_order_items(&self, order_id: &str) -> Result<Vec<SpOrderItem>, AdapterError> {
        let path = format!("/orders/v0/orders/{order_id}/orderItems");
        fetch_all_pages(0, |page| {
            let path = path.clone();
            async move {
                let mut query: Vec<(&str, &str)> = Vec::new();
                if let Some(token) = page.cursor.as_deref() {
                    query.push(("NextToken", token));
                }
                let items: SpApiEnvelope<OrderItemsPayload> =
                    self.get_json(&path, &query).await?;
                Ok(Page {
                    items: items.payload.order_items,
                    next_cursor: items.payload.next_token,
                })
            }
        })
        .await
    }

    /// Translate a canonical topic to an SP-API notification type.
    fn notification_type(topic: &WebhookTopic) -> Result<&'static str, AdapterError> {
        match topic {
            WebhookTopic::OrderCreated | WebhookTopic::OrderUpdated => Ok("ORDER_CHANGE"),
            WebhookTopic::InventoryUpdated => Ok("FBA_INVENTORY_AVAILABILITY_CHANGES"),
            WebhookTopic::ProductCreated
            | WebhookTopic::ProductUpdated
            | WebhookTopic::ProductDeleted => Ok("LISTINGS_ITEM_STATUS_CHANGE"),
            _ => Err(AdapterError::unsupported(
                Platform::Amazon,
                "notifications for this topic",
            )),
        }
    }
}

#[async_trait]
impl PlatformAdapter for AmazonAdapter {
    fn platform(&self) -> Platform {
        Platform::Amazon
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::all().without(Capability::Customers)
    }

    // -------------------------------------------------------------------------
    // Connection / Auth
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn test_connection(&self) -> Result<ConnectionInfo, AdapterError> {
        let participations: SpApiEnvelope<Vec<MarketplaceParticipation>> = self
            .get_json("/sellers/v1/marketplaceParticipations", &[])
            .await?;

        let account = participations
            .payload
            .iter()
            .find(|p| p.marketplace.id == self.inner.config.marketplace_id)
            .or_else(|| participations.payload.first())
            .map(|p| p.marketplace.name.clone().unwrap_or_else(|| p.marketplace.id.clone()));

        Ok(ConnectionInfo {
            platform: Platform::Amazon,
            account,
            state: ConnectionState::Connected,
        })
    }

    fn auth_url(&self, redirect_uri: &str, state: &str) -> Result<String, AdapterError> {
        Ok(format!(
            "{CONSENT_URL}?application_id={}&redirect_uri={}&state={}&version=beta",
            urlencoding::encode(&self.inner.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        ))
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AdapterError> {
        let config = &self.inner.config;
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose_secret()),
        ];

        let request = self
            .inner
            .transport
            .client()
            .post(LWA_TOKEN_ENDPOINT)
            .form(&params);
        let response = self.inner.transport.execute(request).await?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("LWA token response: {e}")))?;

        self.inner
            .tokens
            .set(OAuthToken::from_response(
                token.access_token.clone(),
                token.refresh_token.clone(),
                token.expires_in,
            ))
            .await;

        Ok(token)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_products(
        &self,
        page: PageRequest,
    ) -> Result<Page<CanonicalProduct>, AdapterError> {
        let config = &self.inner.config;
        let limit = page.limit.to_string();
        let mut query = vec![
            ("marketplaceIds", config.marketplace_id.as_str()),
            ("includedData", "summaries,offers"),
            ("pageSize", limit.as_str()),
        ];
        if let Some(token) = page.cursor.as_deref() {
            query.push(("pageToken", token));
        }

        let path = format!("/listings/2021-08-01/items/{}", config.seller_id);
        let response: ListingsSearchResponse = self.get_json(&path, &query).await?;

        Ok(Page {
            items: response
                .items
                .iter()
                .map(|item| convert_product(item, &config.marketplace_id))
                .collect(),
            next_cursor: response.pagination.and_then(|p| p.next_page_token),
        })
    }

    /// Listings are keyed by SKU; `id` here is the merchant SKU, not the
    /// ASIN.
    #[instrument(skip(self))]
    async fn get_product(&self, id: &str) -> Result<CanonicalProduct, AdapterError> {
        let config = &self.inner.config;
        let path = format!("/listings/2021-08-01/items/{}/{id}", config.seller_id);
        let item: ListingsItem = self
            .get_json(
                &path,
                &[
                    ("marketplaceIds", config.marketplace_id.as_str()),
                    ("includedData", "summaries,offers"),
                ],
            )
            .await?;

        Ok(convert_product(&item, &config.marketplace_id))
    }

    #[instrument(skip(self, product))]
    async fn create_product(&self, product: &CanonicalProduct) -> Result<String, AdapterError> {
        let Some(sku) = product.sku.as_deref() else {
            return Err(AdapterError::Configuration(
                "Amazon listings are keyed by SKU; the product must carry one".to_string(),
            ));
        };

        let config = &self.inner.config;
        let path = format!("/listings/2021-08-01/items/{}/{sku}", config.seller_id);
        let body = serde_json::json!({
            "productType": "PRODUCT",
            "requirements": "LISTING_OFFER_ONLY",
            "attributes": conversions::listing_attributes(product),
        });

        let response: ListingsSubmissionResponse = self
            .send_json(
                reqwest::Method::PUT,
                &path,
                &[("marketplaceIds", config.marketplace_id.as_str())],
                &body,
            )
            .await?;

        Ok(response.sku.unwrap_or_else(|| sku.to_string()))
    }

    #[instrument(skip(self, product))]
    async fn update_product(
        &self,
        id: &str,
        product: &CanonicalProduct,
    ) -> Result<(), AdapterError> {
        let config = &self.inner.config;
        let path = format!("/listings/2021-08-01/items/{}/{id}", config.seller_id);
        let body = serde_json::json!({
            "productType": "PRODUCT",
            "patches": conversions::listing_patches(product),
        });

        let _: ListingsSubmissionResponse = self
            .send_json(
                reqwest::Method::PATCH,
                &path,
                &[("marketplaceIds", config.marketplace_id.as_str())],
                &body,
            )
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: &str) -> Result<(), AdapterError> {
        let config = &self.inner.config;
        let path = format!("/listings/2021-08-01/items/{}/{id}", config.seller_id);
        let token = self.access_token().await?;

        let request = self
            .inner
            .transport
            .client()
            .delete(format!("{}{path}", self.base_url()))
            .header("x-amz-access-token", token.bearer())
            .query(&[("marketplaceIds", config.marketplace_id.as_str())]);
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
        let config = &self.inner.config;
        let mut query = vec![
            ("granularityType", "Marketplace"),
            ("granularityId", config.marketplace_id.as_str()),
            ("marketplaceIds", config.marketplace_id.as_str()),
            ("details", "true"),
        ];
        if let Some(token) = page.cursor.as_deref() {
            query.push(("nextToken", token));
        }

        let response: InventorySummariesResponse = self
            .get_json("/fba/inventory/v1/summaries", &query)
            .await?;

        Ok(Page {
            items: response
                .payload
                .inventory_summaries
                .iter()
                .map(convert_inventory)
                .collect(),
            next_cursor: response.pagination.and_then(|p| p.next_token),
        })
    }

    /// Sets merchant-fulfilled availability; FBA quantities are
    /// warehouse-controlled and cannot be written.
    #[instrument(skip(self))]
    async fn set_inventory_quantity(
        &self,
        sku: &str,
        quantity: i64,
    ) -> Result<(), AdapterError> {
        let config = &self.inner.config;
        let path = format!("/listings/2021-08-01/items/{}/{sku}", config.seller_id);
        let body = serde_json::json!({
            "productType": "PRODUCT",
            "patches": [{
                "op": "replace",
                "path": "/attributes/fulfillment_availability",
                "value": [{
                    "fulfillment_channel_code": "DEFAULT",
                    "quantity": quantity.max(0),
                }],
            }],
        });

        let _: ListingsSubmissionResponse = self
            .send_json(
                reqwest::Method::PATCH,
                &path,
                &[("marketplaceIds", config.marketplace_id.as_str())],
                &body,
            )
            .await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_orders(&self, query: OrderQuery) -> Result<Page<CanonicalOrder>, AdapterError> {
        let config = &self.inner.config;
        let updated_after = query
            .updated_after
            .unwrap_or_else(|| chrono::Utc::now() - chrono::Duration::days(30))
            .to_rfc3339();
        let limit = query.page.limit.to_string();

        let mut params = vec![
            ("MarketplaceIds", config.marketplace_id.as_str()),
            ("LastUpdatedAfter", updated_after.as_str()),
            ("MaxResultsPerPage", limit.as_str()),
        ];
        if let Some(token) = query.page.cursor.as_deref() {
            params.push(("NextToken", token));
        }

        let response: SpApiEnvelope<OrdersPayload> =
            self.get_json("/orders/v0/orders", &params).await?;

        // Enrich each order with its line items through a bounded pool;
        // `buffered` preserves platform order while overlapping the fetches.
        let enriched: Vec<Result<CanonicalOrder, AdapterError>> =
            futures::stream::iter(response.payload.orders.into_iter().map(|order| {
                let adapter = self.clone();
                async move {
                    let items = adapter.fetch_order_items(&order.amazon_order_id).await?;
                    Ok(convert_order(&order, &items))
                }
            }))
            .buffered(DETAIL_FETCH_CONCURRENCY)
            .collect()
            .await;

        let items = enriched.into_iter().collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            next_cursor: response.payload.next_token,
        })
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: &str) -> Result<CanonicalOrder, AdapterError> {
        let order: SpApiEnvelope<SpOrder> =
            self.get_json(&format!("/orders/v0/orders/{id}"), &[]).await?;
        let items = self.fetch_order_items(id).await?;

        Ok(convert_order(&order.payload, &items))
    }

    /// Amazon only accepts shipment confirmation; other transitions are a
    /// declared gap.
    #[instrument(skip(self))]
    async fn update_order_status(
        &self,
        id: &str,
        status: FulfillmentStatus,
    ) -> Result<(), AdapterError> {
        if status != FulfillmentStatus::Fulfilled {
            return Err(AdapterError::unsupported(
                Platform::Amazon,
                "order status transitions other than shipment confirmation",
            ));
        }

        self.fulfill_order(id, &FulfillmentRequest::default()).await
    }

    #[instrument(skip(self, fulfillment))]
    async fn fulfill_order(
        &self,
        id: &str,
        fulfillment: &FulfillmentRequest,
    ) -> Result<(), AdapterError> {
        let config = &self.inner.config;
        let path = format!("/orders/v0/orders/{id}/shipmentConfirmation");
        let body = serde_json::json!({
            "marketplaceId": config.marketplace_id,
            "packageDetail": {
                "packageReferenceId": "1",
                "carrierCode": fulfillment.carrier.as_deref().unwrap_or("Other"),
                "trackingNumber": fulfillment.tracking_number,
                "shipDate": chrono::Utc::now().to_rfc3339(),
            },
        });

        let token = self.access_token().await?;
        let request = self
            .inner
            .transport
            .client()
            .post(format!("{}{path}", self.base_url()))
            .header("x-amz-access-token", token.bearer())
            .json(&body);
        self.inner.transport.execute(request).await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    async fn list_customers(
        &self,
        _page: PageRequest,
    ) -> Result<Page<CanonicalCustomer>, AdapterError> {
        Err(AdapterError::unsupported(
            Platform::Amazon,
            "direct customer record access",
        ))
    }

    async fn get_customer(&self, _id: &str) -> Result<CanonicalCustomer, AdapterError> {
        Err(AdapterError::unsupported(
            Platform::Amazon,
            "direct customer record access",
        ))
    }

    // -------------------------------------------------------------------------
    // Webhooks
    // -------------------------------------------------------------------------

    /// The returned handle is `TYPE:subscriptionId` - the Notifications API
    /// scopes subscriptions by type, and unregistering needs both halves.
    #[instrument(skip(self))]
    async fn register_webhook(
        &self,
        topic: &WebhookTopic,
        address: &str,
    ) -> Result<String, AdapterError> {
        let notification_type = Self::notification_type(topic)?;
        let path = format!("/notifications/v1/subscriptions/{notification_type}");
        let body = serde_json::json!({
            "payloadVersion": "1.0",
            "destinationId": address,
        });

        let response: SpApiEnvelope<SubscriptionPayload> = self
            .send_json(reqwest::Method::POST, &path, &[], &body)
            .await?;

        Ok(format!(
            "{notification_type}:{}",
            response.payload.subscription_id
        ))
    }

    #[instrument(skip(self))]
    async fn unregister_webhook(&self, webhook_id: &str) -> Result<(), AdapterError> {
        let Some((notification_type, subscription_id)) = webhook_id.split_once(':') else {
            return Err(AdapterError::InvalidResponse(format!(
                "malformed Amazon webhook handle: {webhook_id}"
            )));
        };

        let token = self.access_token().await?;
        let request = self
            .inner
            .transport
            .client()
            .delete(format!(
                "{}/notifications/v1/subscriptions/{notification_type}/{subscription_id}",
                self.base_url()
            ))
            .header("x-amz-access-token", token.bearer());
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

impl std::fmt::Debug for AmazonAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmazonAdapter")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::AmazonRegion;

    fn adapter() -> AmazonAdapter {
        AmazonAdapter::new(AmazonConfig {
            region: AmazonRegion::Na,
            client_id: "amzn1.application-oa2-client.abc".to_string(),
            client_secret: SecretString::from("test-secret"),
            refresh_token: SecretString::from("Atzr|test-refresh"),
            seller_id: "A2SELLER123".to_string(),
            marketplace_id: "ATVPDKIKX0DER".to_string(),
            webhook_secret: SecretString::from("hook-secret"),
        })
    }

    #[test]
    fn test_customers_capability_absent() {
        let adapter = adapter();
        assert!(!adapter.capabilities().contains(Capability::Customers));
        assert!(adapter.capabilities().contains(Capability::Orders));
    }

    #[tokio::test]
    async fn test_list_customers_is_declared_gap() {
        let err = adapter()
            .list_customers(PageRequest::first())
            .await
            .expect_err("Amazon has no customer API");
        assert!(matches!(err, AdapterError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_auth_url_carries_state() {
        let url = adapter()
            .auth_url("https://app.tidemark.dev/callback", "csrf-123")
            .expect("auth url");
        assert!(url.starts_with(CONSENT_URL));
        assert!(url.contains("state=csrf-123"));
        assert!(url.contains("application_id=amzn1.application-oa2-client.abc"));
    }

    #[test]
    fn test_notification_type_translation() {
        assert_eq!(
            AmazonAdapter::notification_type(&WebhookTopic::OrderCreated).expect("type"),
            "ORDER_CHANGE"
        );
        assert!(AmazonAdapter::notification_type(&WebhookTopic::CustomerCreated).is_err());
    }

    #[test]
    fn test_webhook_signature_round_trip() {
        let adapter = adapter();
        let body = br#"{"orderId":"113-0001"}"#;
        let signature = crate::signature::hmac_base64(b"hook-secret", body);
        assert!(adapter.verify_webhook_signature(body, &signature).is_ok());
        assert!(adapter.verify_webhook_signature(body, "bad").is_err());
    }
}
