//! The adapter contract every platform connector implements.
//!
//! Operations are grouped by domain: connection/auth, products, inventory,
//! orders, customers, and webhooks. A platform that genuinely cannot support
//! an operation declares the gap in its [`CapabilitySet`] and fails the call
//! with [`AdapterError::UnsupportedOperation`] - never by silently returning
//! empty or partial data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tidemark_core::{
    CanonicalCustomer, CanonicalInventory, CanonicalOrder, CanonicalProduct, ConnectionState,
    FulfillmentStatus, Platform, WebhookTopic,
};

use crate::error::AdapterError;

// =============================================================================
// Capabilities
// =============================================================================

/// One operation family an adapter may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Product catalog read/write.
    Products,
    /// Inventory read and quantity updates.
    Inventory,
    /// Order read, status updates, and fulfillment.
    Orders,
    /// Direct customer record access.
    Customers,
    /// Webhook registration and verification.
    Webhooks,
}

impl Capability {
    const ALL: [Self; 5] = [
        Self::Products,
        Self::Inventory,
        Self::Orders,
        Self::Customers,
        Self::Webhooks,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::Products => 1,
            Self::Inventory => 1 << 1,
            Self::Orders => 1 << 2,
            Self::Customers => 1 << 3,
            Self::Webhooks => 1 << 4,
        }
    }
}

/// The set of capabilities an adapter instance declares.
///
/// Callers check membership before invoking an operation rather than
/// catching a thrown "not implemented" error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// All capability families.
    #[must_use]
    pub const fn all() -> Self {
        Self(0b1_1111)
    }

    /// Add a capability (builder style).
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Remove a capability (builder style).
    #[must_use]
    pub const fn without(self, capability: Capability) -> Self {
        Self(self.0 & !capability.bit())
    }

    /// Whether the set contains `capability`.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Iterate over the contained capabilities.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |cap| self.contains(*cap))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Default page size for list operations.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Bound on concurrent per-item detail fetches (e.g., order line items).
///
/// Small enough to respect platform rate limits, large enough to avoid
/// fully serial one-at-a-time latency.
pub const DETAIL_FETCH_CONCURRENCY: usize = 4;

/// A request for one page of results.
///
/// The cursor is an opaque, adapter-owned continuation value: a platform
/// `NextToken`, a numeric page, or an offset, depending on the platform.
/// Cursors from one adapter are meaningless to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Continuation cursor from the previous page, `None` for the first.
    pub cursor: Option<String>,
    /// Maximum items to return.
    pub limit: u32,
}

impl PageRequest {
    /// First page with the default limit.
    #[must_use]
    pub fn first() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Continuation of this request with a new cursor.
    #[must_use]
    pub fn next(&self, cursor: String) -> Self {
        Self {
            cursor: Some(cursor),
            limit: self.limit,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in this page, in platform order.
    pub items: Vec<T>,
    /// Cursor for the next page, `None` when the platform signals the end.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// A final page holding `items`.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

/// Drive a paginated fetch to completion, strictly in cursor order.
///
/// Pages are requested one at a time - out-of-order fetches are not
/// permitted because some platforms return non-reorderable opaque cursors.
///
/// # Errors
///
/// Propagates the first page fetch failure; previously fetched items are
/// discarded so callers never see a partial result masquerading as a
/// complete one.
pub async fn fetch_all_pages<T, F, Fut>(
    limit: u32,
    mut fetch: F,
) -> Result<Vec<T>, AdapterError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, AdapterError>>,
{
    let mut items = Vec::new();
    let mut request = PageRequest {
        cursor: None,
        limit,
    };

    loop {
        let page = fetch(request.clone()).await?;
        items.extend(page.items);
        match page.next_cursor {
            Some(cursor) => request = request.next(cursor),
            None => return Ok(items),
        }
    }
}

// =============================================================================
// Operation Inputs/Outputs
// =============================================================================

/// Result of a connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Platform tested.
    pub platform: Platform,
    /// Account/store identifier the platform reported, when available.
    pub account: Option<String>,
    /// Resulting connection state.
    pub state: ConnectionState,
}

/// Token payload returned by an authorization-code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token for API calls.
    pub access_token: String,
    /// Refresh token, when the platform issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: i64,
}

/// Filters for order listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    /// Only orders updated after this instant.
    pub updated_after: Option<DateTime<Utc>>,
    /// Page to fetch.
    pub page: PageRequest,
}

/// Tracking details for fulfilling an order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulfillmentRequest {
    /// Carrier name (e.g., "UPS").
    pub carrier: Option<String>,
    /// Tracking number.
    pub tracking_number: Option<String>,
    /// Customer-facing tracking URL.
    pub tracking_url: Option<String>,
    /// Whether to notify the customer, where the platform supports it.
    pub notify_customer: bool,
}

// =============================================================================
// The Contract
// =============================================================================

/// A platform connector translating one e-commerce API into the canonical
/// model.
///
/// Every mutating operation is idempotent at the platform-id level: network
/// timeouts leave client-side state ambiguous, and callers retry.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// The platform this adapter connects to.
    fn platform(&self) -> Platform;

    /// The operations this adapter instance supports.
    fn capabilities(&self) -> CapabilitySet;

    // -------------------------------------------------------------------------
    // Connection / Auth
    // -------------------------------------------------------------------------

    /// Verify credentials with a cheap read call.
    ///
    /// Also the recovery path for connections in the error state.
    async fn test_connection(&self) -> Result<ConnectionInfo, AdapterError>;

    /// Build the platform authorization URL for the OAuth consent screen.
    ///
    /// `state` is the caller's CSRF token and is echoed back on the
    /// callback.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` for platforms authenticated by pre-provisioned
    /// key/secret pairs.
    fn auth_url(&self, redirect_uri: &str, state: &str) -> Result<String, AdapterError>;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AdapterError>;

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// List products, one page at a time.
    async fn list_products(
        &self,
        page: PageRequest,
    ) -> Result<Page<CanonicalProduct>, AdapterError>;

    /// Fetch one product by platform-native ID.
    async fn get_product(&self, id: &str) -> Result<CanonicalProduct, AdapterError>;

    /// Create a product; returns the platform-native ID.
    async fn create_product(&self, product: &CanonicalProduct) -> Result<String, AdapterError>;

    /// Update an existing product.
    async fn update_product(
        &self,
        id: &str,
        product: &CanonicalProduct,
    ) -> Result<(), AdapterError>;

    /// Delete a product.
    async fn delete_product(&self, id: &str) -> Result<(), AdapterError>;

    // -------------------------------------------------------------------------
    // Inventory
    // -------------------------------------------------------------------------

    /// List inventory snapshots, one page at a time.
    async fn list_inventory(
        &self,
        page: PageRequest,
    ) -> Result<Page<CanonicalInventory>, AdapterError>;

    /// Set the on-hand quantity for a SKU.
    async fn set_inventory_quantity(&self, sku: &str, quantity: i64)
    -> Result<(), AdapterError>;

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// List orders matching `query`, one page at a time.
    async fn list_orders(&self, query: OrderQuery)
    -> Result<Page<CanonicalOrder>, AdapterError>;

    /// Fetch one order with full line-item detail.
    async fn get_order(&self, id: &str) -> Result<CanonicalOrder, AdapterError>;

    /// Update an order's fulfillment status.
    async fn update_order_status(
        &self,
        id: &str,
        status: FulfillmentStatus,
    ) -> Result<(), AdapterError>;

    /// Mark an order shipped with tracking details.
    async fn fulfill_order(
        &self,
        id: &str,
        fulfillment: &FulfillmentRequest,
    ) -> Result<(), AdapterError>;

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    /// List customers, one page at a time.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` on platforms without direct customer record
    /// access (Amazon, eBay).
    async fn list_customers(
        &self,
        page: PageRequest,
    ) -> Result<Page<CanonicalCustomer>, AdapterError>;

    /// Fetch one customer by platform-native ID.
    async fn get_customer(&self, id: &str) -> Result<CanonicalCustomer, AdapterError>;

    // -------------------------------------------------------------------------
    // Webhooks
    // -------------------------------------------------------------------------

    /// Register a webhook for `topic` delivered to `address`; returns the
    /// platform-native webhook ID.
    async fn register_webhook(
        &self,
        topic: &WebhookTopic,
        address: &str,
    ) -> Result<String, AdapterError>;

    /// Remove a previously registered webhook.
    async fn unregister_webhook(&self, webhook_id: &str) -> Result<(), AdapterError>;

    /// Verify a webhook delivery signature over the raw, unparsed body.
    fn verify_webhook_signature(
        &self,
        raw_body: &[u8],
        signature: &str,
    ) -> Result<(), AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_set_membership() {
        let set = CapabilitySet::all().without(Capability::Customers);
        assert!(set.contains(Capability::Products));
        assert!(set.contains(Capability::Webhooks));
        assert!(!set.contains(Capability::Customers));
        assert_eq!(set.iter().count(), 4);
    }

    #[test]
    fn test_capability_set_from_iter() {
        let set: CapabilitySet = [Capability::Orders, Capability::Inventory]
            .into_iter()
            .collect();
        assert!(set.contains(Capability::Orders));
        assert!(!set.contains(Capability::Products));
    }

    #[tokio::test]
    async fn test_fetch_all_pages_in_cursor_order() {
        let mut seen = Vec::new();
        let items = fetch_all_pages(2, |request| {
            seen.push(request.cursor.clone());
            async move {
                match request.cursor.as_deref() {
                    None => Ok(Page {
                        items: vec![1, 2],
                        next_cursor: Some("p2".to_string()),
                    }),
                    Some("p2") => Ok(Page {
                        items: vec![3],
                        next_cursor: Some("p3".to_string()),
                    }),
                    Some("p3") => Ok(Page::last(vec![4])),
                    Some(other) => Err(AdapterError::InvalidResponse(format!(
                        "unexpected cursor {other}"
                    ))),
                }
            }
        })
        .await
        .expect("all pages");

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(
            seen,
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fetch_all_pages_propagates_errors() {
        let result: Result<Vec<i32>, _> = fetch_all_pages(10, |request| async move {
            if request.cursor.is_none() {
                Ok(Page {
                    items: vec![1],
                    next_cursor: Some("boom".to_string()),
                })
            } else {
                Err(AdapterError::Network("connection reset".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(AdapterError::Network(_))));
    }
}
