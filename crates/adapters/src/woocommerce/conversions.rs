//! Mapping from WooCommerce payloads to the canonical model.

use rust_decimal::Decimal;
use tidemark_core::{
    CanonicalAddress, CanonicalCustomer, CanonicalInventory, CanonicalLineItem, CanonicalOrder,
    CanonicalProduct, CanonicalVariant, FinancialStatus, FulfillmentStatus, OrderCustomer,
    Platform, ProductImage, ProductStatus,
};

use crate::mapping::{clamp_quantity, parse_money, parse_timestamp};

use super::types::{WcAddress, WcCustomer, WcLineItem, WcOrder, WcProduct, WcVariation};

// =============================================================================
// Status Tables
// =============================================================================

/// Map a WooCommerce order status slug to canonical fulfillment.
///
/// WooCommerce has no partial-shipment state; unknown slugs - including
/// custom statuses plugins register - fall back to `Unfulfilled`.
pub fn map_fulfillment_status(status: Option<&str>) -> FulfillmentStatus {
    match status {
        Some("completed") => FulfillmentStatus::Fulfilled,
        Some("cancelled" | "failed" | "trash") => FulfillmentStatus::Cancelled,
        // pending, processing, on-hold, refunded, custom slugs
        _ => FulfillmentStatus::Unfulfilled,
    }
}

/// Map a WooCommerce order status slug to canonical financial status.
/// Unknown slugs fall back to `Pending`.
pub fn map_financial_status(status: Option<&str>) -> FinancialStatus {
    match status {
        Some("processing" | "completed") => FinancialStatus::Paid,
        Some("refunded") => FinancialStatus::Refunded,
        Some("cancelled" | "trash") => FinancialStatus::Voided,
        // pending, on-hold, failed, custom slugs
        _ => FinancialStatus::Pending,
    }
}

/// Map a product status slug to the canonical lifecycle.
fn map_product_status(status: Option<&str>) -> ProductStatus {
    match status {
        Some("publish") => ProductStatus::Active,
        Some("private" | "trash") => ProductStatus::Archived,
        // draft, pending, unknown
        _ => ProductStatus::Draft,
    }
}

// =============================================================================
// Products
// =============================================================================

/// Map a product plus its separately fetched variations.
pub fn convert_product(product: &WcProduct, variations: &[WcVariation]) -> CanonicalProduct {
    let mut canonical = CanonicalProduct::new(Platform::Woocommerce, product.id.to_string());

    canonical.sku = product.sku.clone().filter(|s| !s.is_empty());
    canonical.title = product.name.clone().unwrap_or_default();
    canonical.description = product.description.clone().unwrap_or_default();
    canonical.price = parse_money(product.price.as_deref());
    canonical.compare_at_price = product
        .regular_price
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| parse_money(Some(s)));
    canonical.variants = variations.iter().map(convert_variant).collect();
    // Variable products carry inventory per variation
    canonical.inventory_quantity = if canonical.variants.is_empty() {
        product.stock_quantity.unwrap_or(0).max(0)
    } else {
        canonical
            .variants
            .iter()
            .map(|v| v.inventory_quantity)
            .sum()
    };
    canonical.images = product
        .images
        .iter()
        .enumerate()
        .map(|(index, image)| ProductImage {
            platform_id: image.id.map(|id| id.to_string()),
            url: image.src.clone().unwrap_or_default(),
            alt_text: image.alt.clone().filter(|s| !s.is_empty()),
            position: i64::try_from(index).ok().map(|i| i + 1),
        })
        .collect();
    canonical.status = map_product_status(product.status.as_deref());
    canonical.created_at = parse_timestamp(product.date_created_gmt.as_deref());
    canonical.updated_at = parse_timestamp(product.date_modified_gmt.as_deref());
    canonical.platform_url = product.permalink.clone();

    canonical
}

fn convert_variant(variation: &WcVariation) -> CanonicalVariant {
    let options: std::collections::BTreeMap<String, String> = variation
        .attributes
        .iter()
        .filter_map(|attr| Some((attr.name.clone()?, attr.option.clone().unwrap_or_default())))
        .collect();

    CanonicalVariant {
        platform_id: variation.id.to_string(),
        sku: variation.sku.clone().filter(|s| !s.is_empty()),
        title: options.values().cloned().collect::<Vec<_>>().join(" / "),
        price: parse_money(variation.price.as_deref()),
        compare_at_price: variation
            .regular_price
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| parse_money(Some(s))),
        inventory_quantity: variation.stock_quantity.unwrap_or(0).max(0),
        options,
        image_url: variation
            .image
            .as_ref()
            .and_then(|i| i.src.clone())
            .filter(|s| !s.is_empty()),
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Map an order; line items arrive inline, so this is a single-payload
/// mapping.
pub fn convert_order(order: &WcOrder, store_url: &str) -> CanonicalOrder {
    let mut canonical = CanonicalOrder::new(Platform::Woocommerce, order.id.to_string());

    canonical.order_number = order.number.clone().filter(|s| !s.is_empty());
    canonical.customer = OrderCustomer {
        platform_id: order
            .customer_id
            .filter(|id| *id > 0)
            .map(|id| id.to_string()),
        email: order.billing.as_ref().and_then(|b| b.email.clone()),
        first_name: order.billing.as_ref().and_then(|b| b.first_name.clone()),
        last_name: order.billing.as_ref().and_then(|b| b.last_name.clone()),
        phone: order.billing.as_ref().and_then(|b| b.phone.clone()),
    };
    canonical.line_items = order.line_items.iter().map(convert_line_item).collect();

    if let Some(currency) = order.currency.clone() {
        canonical.currency_code = currency;
    }
    // WooCommerce reports no order-level subtotal; reconstruct it from the
    // pre-discount line subtotals
    canonical.subtotal_price = order
        .line_items
        .iter()
        .map(|item| parse_money(item.subtotal.as_deref()))
        .sum();
    canonical.total_tax = parse_money(order.total_tax.as_deref());
    canonical.total_shipping = parse_money(order.shipping_total.as_deref());
    canonical.total_discounts = parse_money(order.discount_total.as_deref());
    canonical.total_price = parse_money(order.total.as_deref());
    canonical.financial_status = map_financial_status(order.status.as_deref());
    canonical.fulfillment_status = map_fulfillment_status(order.status.as_deref());
    canonical.shipping_address = order.shipping.as_ref().map(convert_address);
    canonical.billing_address = order.billing.as_ref().map(convert_address);
    canonical.note = order.customer_note.clone().filter(|s| !s.is_empty());
    canonical.created_at = parse_timestamp(order.date_created_gmt.as_deref());
    canonical.updated_at = parse_timestamp(order.date_modified_gmt.as_deref());
    canonical.platform_url = Some(format!(
        "{store_url}/wp-admin/post.php?post={}&action=edit",
        order.id
    ));

    canonical
}

fn convert_line_item(item: &WcLineItem) -> CanonicalLineItem {
    let quantity = clamp_quantity(item.quantity.unwrap_or(1));
    let subtotal = parse_money(item.subtotal.as_deref());
    let total = parse_money(item.total.as_deref());

    CanonicalLineItem {
        platform_id: item.id.to_string(),
        product_id: item.product_id.map(|id| id.to_string()),
        variant_id: item
            .variation_id
            .filter(|id| *id > 0)
            .map(|id| id.to_string()),
        sku: item.sku.clone().filter(|s| !s.is_empty()),
        title: item.name.clone().unwrap_or_default(),
        quantity,
        price: subtotal / Decimal::from(quantity),
        // Discount is the gap between pre- and post-discount line totals
        total_discount: (subtotal - total).max(Decimal::ZERO),
        tax: parse_money(item.total_tax.as_deref()),
        total_price: total,
    }
}

fn convert_address(address: &WcAddress) -> CanonicalAddress {
    CanonicalAddress {
        address1: address.address_1.clone().filter(|s| !s.is_empty()),
        address2: address.address_2.clone().filter(|s| !s.is_empty()),
        city: address.city.clone().filter(|s| !s.is_empty()),
        province_code: address.state.clone().filter(|s| !s.is_empty()),
        country_code: address.country.clone().filter(|s| !s.is_empty()),
        zip: address.postcode.clone().filter(|s| !s.is_empty()),
        first_name: address.first_name.clone().filter(|s| !s.is_empty()),
        last_name: address.last_name.clone().filter(|s| !s.is_empty()),
        company: address.company.clone().filter(|s| !s.is_empty()),
        phone: address.phone.clone().filter(|s| !s.is_empty()),
    }
}

// =============================================================================
// From-canonical Mapping
// =============================================================================

/// Canonical lifecycle to WooCommerce status slug.
pub const fn status_slug(status: ProductStatus) -> &'static str {
    match status {
        ProductStatus::Active => "publish",
        ProductStatus::Draft => "draft",
        ProductStatus::Archived => "private",
    }
}

/// Payload for creating a product from a canonical product.
pub fn product_create_payload(product: &CanonicalProduct) -> serde_json::Value {
    serde_json::json!({
        "name": product.title,
        "type": "simple",
        "sku": product.sku,
        "description": product.description,
        "regular_price": product.price.to_string(),
        "manage_stock": true,
        "stock_quantity": product.inventory_quantity,
        "status": status_slug(product.status),
    })
}

/// Payload for updating a product from a canonical product.
pub fn product_update_payload(product: &CanonicalProduct) -> serde_json::Value {
    serde_json::json!({
        "name": product.title,
        "description": product.description,
        "regular_price": product.price.to_string(),
        "status": status_slug(product.status),
    })
}

// =============================================================================
// Customers
// =============================================================================

/// Map a customer. Aggregate stats are platform-reported only on stores
/// still exposing the legacy fields; otherwise they stay at zero for local
/// computation.
pub fn convert_customer(customer: &WcCustomer) -> CanonicalCustomer {
    let mut canonical = CanonicalCustomer::new(Platform::Woocommerce, customer.id.to_string());

    canonical.email = customer.email.clone().filter(|s| !s.is_empty());
    canonical.first_name = customer.first_name.clone().filter(|s| !s.is_empty());
    canonical.last_name = customer.last_name.clone().filter(|s| !s.is_empty());
    canonical.phone = customer
        .billing
        .as_ref()
        .and_then(|b| b.phone.clone())
        .filter(|s| !s.is_empty());
    canonical.orders_count = customer.orders_count.unwrap_or(0).max(0);
    canonical.total_spent = parse_money(customer.total_spent.as_deref());
    canonical.default_address = customer.billing.as_ref().map(convert_address);
    canonical.addresses = customer
        .shipping
        .as_ref()
        .map(convert_address)
        .into_iter()
        .collect();
    canonical.created_at = parse_timestamp(customer.date_created_gmt.as_deref());
    canonical.updated_at = parse_timestamp(customer.date_modified_gmt.as_deref());

    canonical
}

// =============================================================================
// Inventory
// =============================================================================

/// Flatten a product (plus variations) into per-SKU inventory snapshots.
pub fn convert_inventory(
    product: &WcProduct,
    variations: &[WcVariation],
) -> Vec<CanonicalInventory> {
    if variations.is_empty() {
        let mut snapshot = CanonicalInventory::new(
            Platform::Woocommerce,
            product.sku.clone().unwrap_or_default(),
        );
        snapshot.quantity = product.stock_quantity.unwrap_or(0).max(0);
        snapshot.updated_at = parse_timestamp(product.date_modified_gmt.as_deref());
        return vec![snapshot];
    }

    variations
        .iter()
        .map(|variation| {
            let mut snapshot = CanonicalInventory::new(
                Platform::Woocommerce,
                variation.sku.clone().unwrap_or_default(),
            );
            snapshot.quantity = variation.stock_quantity.unwrap_or(0).max(0);
            snapshot
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_item() -> WcLineItem {
        WcLineItem {
            id: 31,
            name: Some("Hoodie".to_string()),
            product_id: Some(12),
            variation_id: Some(120),
            sku: Some("HOOD-M".to_string()),
            quantity: Some(2),
            subtotal: Some("60.00".to_string()),
            total: Some("54.00".to_string()),
            total_tax: Some("4.32".to_string()),
        }
    }

    #[test]
    fn test_status_tables() {
        assert_eq!(
            map_fulfillment_status(Some("completed")),
            FulfillmentStatus::Fulfilled
        );
        assert_eq!(
            map_fulfillment_status(Some("processing")),
            FulfillmentStatus::Unfulfilled
        );
        assert_eq!(map_financial_status(Some("processing")), FinancialStatus::Paid);
        assert_eq!(
            map_financial_status(Some("refunded")),
            FinancialStatus::Refunded
        );
        assert_eq!(
            map_fulfillment_status(Some("wc-custom-plugin-status")),
            FulfillmentStatus::Unfulfilled
        );
        assert_eq!(map_financial_status(None), FinancialStatus::Pending);
    }

    #[test]
    fn test_line_item_discount_from_subtotal_gap() {
        let item = convert_line_item(&line_item());
        assert_eq!(item.price, Decimal::from(30));
        assert_eq!(item.total_discount, Decimal::from(6));
        assert_eq!(item.total_price, Decimal::from(54));
        assert!(item.total_reconciles(tidemark_core::RECONCILE_TOLERANCE));
    }

    #[test]
    fn test_convert_order_reconstructs_subtotal() {
        let order = WcOrder {
            id: 727,
            number: Some("727".to_string()),
            status: Some("processing".to_string()),
            currency: Some("EUR".to_string()),
            customer_id: Some(3),
            customer_note: None,
            total: Some("70.82".to_string()),
            total_tax: Some("4.32".to_string()),
            shipping_total: Some("12.50".to_string()),
            discount_total: Some("6.00".to_string()),
            date_created_gmt: Some("2017-03-22T16:28:02".to_string()),
            date_modified_gmt: None,
            billing: None,
            shipping: None,
            line_items: vec![line_item()],
        };

        let canonical = convert_order(&order, "https://shop.example.com");
        assert_eq!(canonical.subtotal_price, Decimal::from(60));
        assert_eq!(canonical.currency_code, "EUR");
        assert!(canonical.totals_reconcile(tidemark_core::RECONCILE_TOLERANCE));
        assert_eq!(
            canonical.created_at.expect("created").to_rfc3339(),
            "2017-03-22T16:28:02+00:00"
        );
    }

    #[test]
    fn test_variable_product_inventory_per_variation() {
        let product = WcProduct {
            id: 12,
            name: Some("Hoodie".to_string()),
            sku: Some("HOOD".to_string()),
            description: None,
            permalink: None,
            product_type: Some("variable".to_string()),
            status: Some("publish".to_string()),
            price: Some("30.00".to_string()),
            regular_price: None,
            stock_quantity: None,
            date_created_gmt: None,
            date_modified_gmt: None,
            variations: vec![120, 121],
            images: vec![],
        };
        let variations = vec![
            WcVariation {
                id: 120,
                sku: Some("HOOD-M".to_string()),
                price: Some("30.00".to_string()),
                regular_price: None,
                stock_quantity: Some(5),
                attributes: vec![],
                image: None,
            },
            WcVariation {
                id: 121,
                sku: Some("HOOD-L".to_string()),
                price: Some("30.00".to_string()),
                regular_price: None,
                stock_quantity: Some(-2),
                attributes: vec![],
                image: None,
            },
        ];

        let snapshots = convert_inventory(&product, &variations);
        assert_eq!(snapshots.len(), 2);
        // Negative platform stock clamps to zero
        assert_eq!(snapshots[1].quantity, 0);

        let canonical = convert_product(&product, &variations);
        assert_eq!(canonical.inventory_quantity, 5);
        assert_eq!(canonical.status, ProductStatus::Active);
    }
}
