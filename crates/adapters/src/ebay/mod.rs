//! eBay Sell APIs adapter.
//!
//! # Architecture
//!
//! - OAuth2 authorization-code flow; access tokens cached with
//!   single-flight refresh through the shared token cache
//! - `limit`/`offset` pagination driven by the response `total`
//! - Orders from the Fulfillment API (line items inline), catalog and
//!   stock from the Inventory API
//!
//! # Capability Gaps
//!
//! eBay exposes buyers only as per-order snapshots; there is no customer
//! records API, so the `Customers` capability is absent.

mod conversions;
mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use secrecy::ExposeSecret;
use tidemark_core::{
    CanonicalCustomer, CanonicalInventory, CanonicalOrder, CanonicalProduct, ConnectionState,
    FulfillmentStatus, Platform, WebhookTopic,
};
use tracing::instrument;

use crate::auth::{OAuthToken, TokenCache};
use crate::config::EbayConfig;
use crate::contract::{
    Capability, CapabilitySet, ConnectionInfo, FulfillmentRequest, OrderQuery, Page, PageRequest,
    PlatformAdapter, TokenResponse,
};
use crate::error::AdapterError;
use crate::signature::verify_hmac_base64;
use crate::transport::Transport;

use conversions::{convert_inventory, convert_order, convert_product};
use types::{
    EbInventoryItem, EbOrder, InventoryItemsResponse, OffersResponse, OrderSearchResponse,
    PrivilegeResponse, SubscriptionResponse,
};

/// Production API host.
const API_BASE: &str = "https://api.ebay.com";

/// User consent screen.
const AUTH_URL: &str = "https://auth.ebay.com/oauth2/authorize";

/// Scopes requested for sell operations.
const SCOPES: &str = "https://api.ebay.com/oauth/api_scope/sell.inventory \
                      https://api.ebay.com/oauth/api_scope/sell.fulfillment \
                      https://api.ebay.com/oauth/api_scope/sell.account";

/// eBay throttles per-app daily; short per-call backoff suffices.
const MIN_RETRY_DELAY: Duration = Duration::from_secs(2);

/// eBay Sell APIs adapter.
#[derive(Clone)]
pub struct EbayAdapter {
    inner: Arc<EbayAdapterInner>,
}

struct EbayAdapterInner {
    config: EbayConfig,
    transport: Transport,
    tokens: TokenCache,
}

impl EbayAdapter {
    /// Create an adapter from configuration.
    #[must_use]
    pub fn new(config: EbayConfig) -> Self {
        Self {
            inner: Arc::new(EbayAdapterInner {
                config,
                transport: Transport::new(Platform::Ebay, MIN_RETRY_DELAY),
                tokens: TokenCache::new(),
            }),
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    fn basic_auth_header(&self) -> String {
        let config = &self.inner.config;
        let credentials = format!(
            "{}:{}",
            config.client_id,
            config.client_secret.expose_secret()
        );
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }

    async fn access_token(&self) -> Result<OAuthToken, AdapterError> {
        self.inner
            .tokens
            .get_or_refresh(|| self.refresh_access_token())
            .await
    }

    /// Run the refresh-token grant.
    #[instrument(skip(self))]
    async fn refresh_access_token(&self) -> Result<OAuthToken, AdapterError> {
        let Some(refresh_token) = self.inner.config.refresh_token.as_ref() else {
            return Err(AdapterError::Authentication(
                "no eBay refresh token configured; complete the OAuth flow first".to_string(),
            ));
        };

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
            ("scope", SCOPES),
        ];

        let request = self
            .inner
            .transport
            .client()
            .post(format!("{API_BASE}/identity/v1/oauth2/token"))
            .header("Authorization", self.basic_auth_header())
            .form(&params);
        let response = self.inner.transport.execute(request).await?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("oauth2/token: {e}")))?;

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
        query: &[(&str, String)],
    ) -> Result<T, AdapterError> {
        let token = self.access_token().await?;
        let request = self
            .inner
            .transport
            .client()
            .get(format!("{API_BASE}{path}"))
            .bearer_auth(token.bearer())
            .query(query);

        let response = self.inner.transport.execute(request).await?;
        response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("{path}: {e}")))
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, AdapterError> {
        let token = self.access_token().await?;
        let request = self
            .inner
            .transport
            .client()
            .request(method, format!("{API_BASE}{path}"))
            .bearer_auth(token.bearer())
            .header("Content-Language", "en-US")
            .json(body);

        self.inner.transport.execute(request).await
    }

    /// Offset bookkeeping: the cursor is the numeric offset.
    fn offset_of(cursor: Option<&str>) -> u64 {
        cursor.and_then(|c| c.parse().ok()).unwrap_or(0)
    }

    fn next_offset(offset: u64, limit: u32, total: Option<u64>) -> Option<String> {
        let next = offset + u64::from(limit);
        total.filter(|t| next < *t).map(|_| next.to_string())
    }

    /// First offer price for a SKU, when one exists.
    async fn offer_price(&self, sku: &str) -> Result<Option<types::EbAmount>, AdapterError> {
        let offers: OffersResponse = self
            .get_json("/sell/inventory/v1/offer", &[("sku", sku.to_string())])
            .await?;

        Ok(offers
            .offers
            .into_iter()
            .next()
            .and_then(|o| o.pricing_summary)
            .and_then(|p| p.price))
    }

    /// Translate a canonical topic to an eBay notification topic ID.
    fn notification_topic(topic: &WebhookTopic) -> Result<&'static str, AdapterError> {
        match topic {
            WebhookTopic::CustomerRedact => Ok("MARKETPLACE_ACCOUNT_DELETION"),
            WebhookTopic::InventoryUpdated => Ok("ITEM_AVAILABILITY"),
            WebhookTopic::ProductUpdated => Ok("ITEM_PRICE_REVISION"),
            _ => Err(AdapterError::unsupported(
                Platform::Ebay,
                "notifications for this topic",
            )),
        }
    }
}

#[async_trait]
impl PlatformAdapter for EbayAdapter {
    fn platform(&self) -> Platform {
        Platform::Ebay
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::all().without(Capability::Customers)
    }

    // -------------------------------------------------------------------------
    // Connection / Auth
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn test_connection(&self) -> Result<ConnectionInfo, AdapterError> {
        let privileges: PrivilegeResponse =
            self.get_json("/sell/account/v1/privilege", &[]).await?;

        let state = if privileges.seller_registration_completed == Some(false) {
            ConnectionState::Pending
        } else {
            ConnectionState::Connected
        };

        Ok(ConnectionInfo {
            platform: Platform::Ebay,
            account: None,
            state,
        })
    }

    fn auth_url(&self, redirect_uri: &str, state: &str) -> Result<String, AdapterError> {
        // eBay routes the callback through the registered RuName; the
        // literal redirect URI is configured on the application, not here.
        let _ = redirect_uri;
        Ok(format!(
            "{AUTH_URL}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            urlencoding::encode(&self.inner.config.client_id),
            urlencoding::encode(&self.inner.config.ru_name),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state)
        ))
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AdapterError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.inner.config.ru_name.as_str()),
        ];

        let request = self
            .inner
            .transport
            .client()
            .post(format!("{API_BASE}/identity/v1/oauth2/token"))
            .header("Authorization", self.basic_auth_header())
            .form(&params);
        let response = self.inner.transport.execute(request).await?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("oauth2/token: {e}")))?;

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
        let offset = Self::offset_of(page.cursor.as_deref());
        let response: InventoryItemsResponse = self
            .get_json(
                "/sell/inventory/v1/inventory_item",
                &[
                    ("limit", page.limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        Ok(Page {
            items: response
                .inventory_items
                .iter()
                .map(|item| convert_product(item, None))
                .collect(),
            next_cursor: Self::next_offset(offset, page.limit, response.total),
        })
    }

    /// `id` is the SKU - the Inventory API keys items by it. The detail
    /// view also resolves the first offer so pricing is populated.
    #[instrument(skip(self))]
    async fn get_product(&self, id: &str) -> Result<CanonicalProduct, AdapterError> {
        let item: EbInventoryItem = self
            .get_json(&format!("/sell/inventory/v1/inventory_item/{id}"), &[])
            .await?;
        let price = self.offer_price(id).await?;

        Ok(convert_product(&item, price.as_ref()))
    }

    #[instrument(skip(self, product))]
    async fn create_product(&self, product: &CanonicalProduct) -> Result<String, AdapterError> {
        let Some(sku) = product.sku.as_deref() else {
            return Err(AdapterError::Configuration(
                "eBay inventory items are keyed by SKU; the product must carry one".to_string(),
            ));
        };

        let body = conversions::inventory_item_payload(product);

        // PUT is create-or-replace, which keeps retries idempotent
        self.send_json(
            reqwest::Method::PUT,
            &format!("/sell/inventory/v1/inventory_item/{sku}"),
            &body,
        )
        .await?;

        Ok(sku.to_string())
    }

    #[instrument(skip(self, product))]
    async fn update_product(
        &self,
        id: &str,
        product: &CanonicalProduct,
    ) -> Result<(), AdapterError> {
        let body = serde_json::json!({
            "product": {
                "title": product.title,
                "description": product.description,
            },
            "availability": {
                "shipToLocationAvailability": { "quantity": product.inventory_quantity.max(0) },
            },
        });

        self.send_json(
            reqwest::Method::PUT,
            &format!("/sell/inventory/v1/inventory_item/{id}"),
            &body,
        )
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: &str) -> Result<(), AdapterError> {
        let token = self.access_token().await?;
        let request = self
            .inner
            .transport
            .client()
            .delete(format!("{API_BASE}/sell/inventory/v1/inventory_item/{id}"))
            .bearer_auth(token.bearer());
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
        let offset = Self::offset_of(page.cursor.as_deref());
        let response: InventoryItemsResponse = self
            .get_json(
                "/sell/inventory/v1/inventory_item",
                &[
                    ("limit", page.limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        Ok(Page {
            items: response
                .inventory_items
                .iter()
                .map(convert_inventory)
                .collect(),
            next_cursor: Self::next_offset(offset, page.limit, response.total),
        })
    }

    #[instrument(skip(self))]
    async fn set_inventory_quantity(
        &self,
        sku: &str,
        quantity: i64,
    ) -> Result<(), AdapterError> {
        // Read-modify-write so the PUT replace does not drop product data
        let mut item: serde_json::Value = self
            .get_json(&format!("/sell/inventory/v1/inventory_item/{sku}"), &[])
            .await?;

        let Some(fields) = item.as_object_mut() else {
            return Err(AdapterError::InvalidResponse(format!(
                "inventory item {sku} is not a JSON object"
            )));
        };
        fields.insert(
            "availability".to_string(),
            serde_json::json!({
                "shipToLocationAvailability": { "quantity": quantity.max(0) },
            }),
        );

        self.send_json(
            reqwest::Method::PUT,
            &format!("/sell/inventory/v1/inventory_item/{sku}"),
            &item,
        )
        .await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_orders(&self, query: OrderQuery) -> Result<Page<CanonicalOrder>, AdapterError> {
        let offset = Self::offset_of(query.page.cursor.as_deref());
        let mut params = vec![
            ("limit", query.page.limit.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(updated_after) = query.updated_after {
            params.push((
                "filter",
                format!(
                    "lastmodifieddate:[{}..]",
                    updated_after.format("%Y-%m-%dT%H:%M:%S%.3fZ")
                ),
            ));
        }

        let response: OrderSearchResponse =
            self.get_json("/sell/fulfillment/v1/order", &params).await?;

        Ok(Page {
            items: response.orders.iter().map(convert_order).collect(),
            next_cursor: Self::next_offset(offset, query.page.limit, response.total),
        })
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: &str) -> Result<CanonicalOrder, AdapterError> {
        let order: EbOrder = self
            .get_json(&format!("/sell/fulfillment/v1/order/{id}"), &[])
            .await?;
        Ok(convert_order(&order))
    }

    /// eBay derives order state from shipping fulfillments; only the
    /// fulfilled transition is expressible.
    #[instrument(skip(self))]
    async fn update_order_status(
        &self,
        id: &str,
        status: FulfillmentStatus,
    ) -> Result<(), AdapterError> {
        if status != FulfillmentStatus::Fulfilled {
            return Err(AdapterError::unsupported(
                Platform::Ebay,
                "order status transitions other than shipping fulfillment",
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
        // Fulfilling the whole order: eBay fills in all line items when the
        // list is omitted from the shipped notice
        let body = serde_json::json!({
            "trackingNumber": fulfillment.tracking_number,
            "shippingCarrierCode": fulfillment.carrier,
            "shippedDate": chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        });

        self.send_json(
            reqwest::Method::POST,
            &format!("/sell/fulfillment/v1/order/{id}/shipping_fulfillment"),
            &body,
        )
        .await?;

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
            Platform::Ebay,
            "direct customer record access",
        ))
    }

    async fn get_customer(&self, _id: &str) -> Result<CanonicalCustomer, AdapterError> {
        Err(AdapterError::unsupported(
            Platform::Ebay,
            "direct customer record access",
        ))
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
        let topic_id = Self::notification_topic(topic)?;
        let body = serde_json::json!({
            "topicId": topic_id,
            "status": "ENABLED",
            "payload": { "format": "JSON" },
            "destinationId": address,
        });

        let response = self
            .send_json(
                reqwest::Method::POST,
                "/commerce/notification/v1/subscription",
                &body,
            )
            .await?;

        let created: SubscriptionResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(format!("subscription: {e}")))?;

        created
            .subscription_id
            .ok_or_else(|| AdapterError::InvalidResponse(
                "subscription created without an id".to_string(),
            ))
    }

    #[instrument(skip(self))]
    async fn unregister_webhook(&self, webhook_id: &str) -> Result<(), AdapterError> {
        let token = self.access_token().await?;
        let request = self
            .inner
            .transport
            .client()
            .delete(format!(
                "{API_BASE}/commerce/notification/v1/subscription/{webhook_id}"
            ))
            .bearer_auth(token.bearer());
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

impl std::fmt::Debug for EbayAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EbayAdapter")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn adapter() -> EbayAdapter {
        EbayAdapter::new(EbayConfig {
            client_id: "TidemarkA-app-PRD-1".to_string(),
            client_secret: SecretString::from("PRD-cert-secret"),
            ru_name: "Tidemark-TidemarkA-app-cb".to_string(),
            refresh_token: None,
            webhook_secret: SecretString::from("ebay-hook-secret"),
        })
    }

    #[test]
    fn test_customers_capability_absent() {
        assert!(!adapter().capabilities().contains(Capability::Customers));
    }

    #[tokio::test]
    async fn test_missing_refresh_token_is_auth_error() {
        let err = adapter()
            .list_orders(OrderQuery::default())
            .await
            .expect_err("no refresh token configured");
        assert!(matches!(err, AdapterError::Authentication(_)));
    }

    #[test]
    fn test_auth_url_uses_ru_name() {
        let url = adapter()
            .auth_url("https://app.tidemark.dev/callback", "csrf-789")
            .expect("auth url");
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("redirect_uri=Tidemark-TidemarkA-app-cb"));
        assert!(url.contains("state=csrf-789"));
    }

    #[test]
    fn test_offset_cursor_bookkeeping() {
        assert_eq!(EbayAdapter::offset_of(None), 0);
        assert_eq!(EbayAdapter::offset_of(Some("100")), 100);
        assert_eq!(
            EbayAdapter::next_offset(0, 50, Some(120)),
            Some("50".to_string())
        );
        assert_eq!(EbayAdapter::next_offset(100, 50, Some(120)), None);
        assert_eq!(EbayAdapter::next_offset(0, 50, None), None);
    }

    #[test]
    fn test_notification_topic_translation() {
        assert_eq!(
            EbayAdapter::notification_topic(&WebhookTopic::CustomerRedact).expect("topic"),
            "MARKETPLACE_ACCOUNT_DELETION"
        );
        assert!(EbayAdapter::notification_topic(&WebhookTopic::OrderCreated).is_err());
    }
}
