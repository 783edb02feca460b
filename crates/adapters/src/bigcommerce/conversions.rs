//! Mapping from BigCommerce payloads to the canonical model.

use rust_decimal::Decimal;
use tidemark_core::{
    CanonicalAddress, CanonicalCustomer, CanonicalInventory, CanonicalLineItem, CanonicalOrder,
    CanonicalProduct, CanonicalVariant, FinancialStatus, FulfillmentStatus, OrderCustomer,
    Platform, ProductImage, ProductStatus,
};

use crate::mapping::{clamp_quantity, non_negative, parse_money, parse_timestamp};

use super::types::{BcCustomer, BcOrder, BcOrderAddress, BcOrderProduct, BcProduct};

// =============================================================================
// Status Tables
// =============================================================================

/// Map a v2 `status_id` to canonical fulfillment.
///
/// | id | platform status            |
/// |----|----------------------------|
/// | 2  | Shipped                    |
/// | 3  | Partially Shipped          |
/// | 5  | Cancelled                  |
/// | 10 | Completed                  |
/// | 11 | Declined                   |
///
/// Anything else - including ids BigCommerce adds later - falls back to
/// `Unfulfilled`.
pub fn map_fulfillment_status(status_id: Option<i64>) -> FulfillmentStatus {
    match status_id {
        Some(2 | 10) => FulfillmentStatus::Fulfilled,
        Some(3) => FulfillmentStatus::Partial,
        Some(5 | 11) => FulfillmentStatus::Cancelled,
        // 0 Incomplete, 1 Pending, 4 Refunded, 7 Awaiting Payment,
        // 8 Awaiting Pickup, 9 Awaiting Shipment, 12 Manual Verification,
        // 13 Disputed, 14 Partially Refunded, unknown
        _ => FulfillmentStatus::Unfulfilled,
    }
}

/// Map a v2 `status_id` to canonical financial status. Unknown ids fall
/// back to `Pending`.
pub fn map_financial_status(status_id: Option<i64>) -> FinancialStatus {
    match status_id {
        Some(2 | 3 | 8 | 9 | 10) => FinancialStatus::Paid,
        Some(4 | 14) => FinancialStatus::Refunded,
        Some(5 | 11) => FinancialStatus::Voided,
        // 0, 1, 7, 12, 13, unknown
        _ => FinancialStatus::Pending,
    }
}

// =============================================================================
// Products
// =============================================================================

fn decimal(value: Option<f64>) -> Decimal {
    value
        .and_then(Decimal::from_f64_retain)
        .map_or(Decimal::ZERO, non_negative)
}

/// Map a v3 catalog product, enumerating inventory per variant.
pub fn convert_product(product: &BcProduct, store_hash: &str) -> CanonicalProduct {
    let mut canonical = CanonicalProduct::new(Platform::Bigcommerce, product.id.to_string());

    canonical.sku = product.sku.clone().filter(|s| !s.is_empty());
    canonical.title = product.name.clone().unwrap_or_default();
    canonical.description = product.description.clone().unwrap_or_default();
    canonical.vendor = product.brand_name.clone();
    canonical.price = decimal(product.price);
    canonical.compare_at_price = product
        .retail_price
        .and_then(Decimal::from_f64_retain)
        .map(non_negative);
    canonical.cost = product
        .cost_price
        .and_then(Decimal::from_f64_retain)
        .map(non_negative);
    canonical.variants = product.variants.iter().map(convert_variant).collect();
    // Multi-variant products carry inventory per variant, not only at the
    // product level
    canonical.inventory_quantity = if canonical.variants.is_empty() {
        product.inventory_level.unwrap_or(0).max(0)
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
        .map(|image| ProductImage {
            platform_id: image.id.map(|id| id.to_string()),
            url: image.url_standard.clone().unwrap_or_default(),
            alt_text: image.description.clone(),
            position: image.sort_order,
        })
        .collect();
    canonical.status = map_product_status(product);
    canonical.seo.title = product.page_title.clone();
    canonical.seo.description = product.meta_description.clone();
    canonical.created_at = parse_timestamp(product.date_created.as_deref());
    canonical.updated_at = parse_timestamp(product.date_modified.as_deref());
    canonical.platform_url = Some(format!(
        "https://store-{store_hash}.mybigcommerce.com/manage/products/{}",
        product.id
    ));

    canonical
}

fn map_product_status(product: &BcProduct) -> ProductStatus {
    match (product.is_visible, product.availability.as_deref()) {
        (_, Some("disabled")) => ProductStatus::Archived,
        (Some(true), _) => ProductStatus::Active,
        _ => ProductStatus::Draft,
    }
}

fn convert_variant(variant: &super::types::BcVariant) -> CanonicalVariant {
    let options: std::collections::BTreeMap<String, String> = variant
        .option_values
        .iter()
        .filter_map(|ov| {
            Some((
                ov.option_display_name.clone()?,
                ov.label.clone().unwrap_or_default(),
            ))
        })
        .collect();

    CanonicalVariant {
        platform_id: variant.id.to_string(),
        sku: variant.sku.clone().filter(|s| !s.is_empty()),
        title: options
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join(" / "),
        price: decimal(variant.price.or(variant.calculated_price)),
        compare_at_price: None,
        inventory_quantity: variant.inventory_level.unwrap_or(0).max(0),
        options,
        image_url: variant.image_url.clone().filter(|s| !s.is_empty()),
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Map a v2 order plus its separately fetched line items and optional
/// shipping address.
pub fn convert_order(
    order: &BcOrder,
    items: &[BcOrderProduct],
    shipping_address: Option<&BcOrderAddress>,
    store_hash: &str,
) -> CanonicalOrder {
    let mut canonical = CanonicalOrder::new(Platform::Bigcommerce, order.id.to_string());

    canonical.order_number = Some(order.id.to_string());
    canonical.customer = OrderCustomer {
        platform_id: order
            .customer_id
            .filter(|id| *id > 0)
            .map(|id| id.to_string()),
        email: order.billing_address.as_ref().and_then(|a| a.email.clone()),
        first_name: order
            .billing_address
            .as_ref()
            .and_then(|a| a.first_name.clone()),
        last_name: order
            .billing_address
            .as_ref()
            .and_then(|a| a.last_name.clone()),
        phone: order.billing_address.as_ref().and_then(|a| a.phone.clone()),
    };
    canonical.line_items = items.iter().map(convert_line_item).collect();

    if let Some(currency) = order.currency_code.clone() {
        canonical.currency_code = currency;
    }
    canonical.subtotal_price = parse_money(order.subtotal_ex_tax.as_deref());
    canonical.total_tax = parse_money(order.total_tax.as_deref());
    canonical.total_shipping = parse_money(order.shipping_cost_ex_tax.as_deref());
    canonical.total_discounts = parse_money(order.discount_amount.as_deref())
        + parse_money(order.coupon_discount.as_deref());
    canonical.total_price = parse_money(order.total_inc_tax.as_deref());
    canonical.financial_status = map_financial_status(order.status_id);
    canonical.fulfillment_status = map_fulfillment_status(order.status_id);
    canonical.shipping_address = shipping_address.map(convert_address);
    canonical.billing_address = order.billing_address.as_ref().map(convert_address);
    canonical.note = order.staff_notes.clone().filter(|s| !s.is_empty());
    canonical.created_at = parse_timestamp(order.date_created.as_deref());
    canonical.updated_at = parse_timestamp(order.date_modified.as_deref());
    canonical.platform_url = Some(format!(
        "https://store-{store_hash}.mybigcommerce.com/manage/orders/{}",
        order.id
    ));

    canonical
}

fn convert_line_item(item: &BcOrderProduct) -> CanonicalLineItem {
    let quantity = clamp_quantity(item.quantity.unwrap_or(1));
    let discount: Decimal = item
        .applied_discounts
        .iter()
        .map(|d| parse_money(d.amount.as_deref()))
        .sum();

    CanonicalLineItem {
        platform_id: item.id.to_string(),
        product_id: item.product_id.map(|id| id.to_string()),
        variant_id: item.variant_id.filter(|id| *id > 0).map(|id| id.to_string()),
        sku: item.sku.clone().filter(|s| !s.is_empty()),
        title: item.name.clone().unwrap_or_default(),
        quantity,
        price: parse_money(item.price_ex_tax.as_deref()),
        total_discount: discount,
        // Absent per-item tax maps to zero, never an error
        tax: parse_money(item.total_tax.as_deref()),
        total_price: parse_money(item.total_ex_tax.as_deref()),
    }
}

fn convert_address(address: &BcOrderAddress) -> CanonicalAddress {
    CanonicalAddress {
        address1: address.street_1.clone(),
        address2: address.street_2.clone(),
        city: address.city.clone(),
        province_code: address.state.clone(),
        country_code: address.country_iso2.clone(),
        zip: address.zip.clone(),
        first_name: address.first_name.clone(),
        last_name: address.last_name.clone(),
        company: address.company.clone().filter(|s| !s.is_empty()),
        phone: address.phone.clone().filter(|s| !s.is_empty()),
    }
}

// =============================================================================
// From-canonical Mapping
// =============================================================================

/// v3 catalog payload for creating a product from a canonical product.
pub fn product_create_payload(product: &CanonicalProduct) -> serde_json::Value {
    serde_json::json!({
        "name": product.title,
        "type": "physical",
        "sku": product.sku,
        "description": product.description,
        "price": product.price,
        "weight": 0,
        "inventory_level": product.inventory_quantity,
        "inventory_tracking": "product",
        "is_visible": product.status == ProductStatus::Active,
    })
}

/// v3 catalog payload for updating a product from a canonical product.
pub fn product_update_payload(product: &CanonicalProduct) -> serde_json::Value {
    serde_json::json!({
        "name": product.title,
        "description": product.description,
        "price": product.price,
        "is_visible": product.status == ProductStatus::Active,
    })
}

// =============================================================================
// Customers
// =============================================================================

/// Map a v3 customer. BigCommerce does not report aggregate spend on the
/// customer object, so stats stay at their zero defaults for local
/// computation.
pub fn convert_customer(customer: &BcCustomer) -> CanonicalCustomer {
    let mut canonical = CanonicalCustomer::new(Platform::Bigcommerce, customer.id.to_string());

    canonical.email = customer.email.clone().filter(|s| !s.is_empty());
    canonical.first_name = customer.first_name.clone().filter(|s| !s.is_empty());
    canonical.last_name = customer.last_name.clone().filter(|s| !s.is_empty());
    canonical.phone = customer.phone.clone().filter(|s| !s.is_empty());
    canonical.accepts_marketing = customer
        .accepts_product_review_abandoned_cart_emails
        .unwrap_or(false);
    canonical.addresses = customer
        .addresses
        .iter()
        .map(|a| CanonicalAddress {
            address1: a.address1.clone(),
            address2: a.address2.clone(),
            city: a.city.clone(),
            province_code: a.state_or_province.clone(),
            country_code: a.country_code.clone(),
            zip: a.postal_code.clone(),
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            company: a.company.clone().filter(|s| !s.is_empty()),
            phone: a.phone.clone().filter(|s| !s.is_empty()),
        })
        .collect();
    canonical.default_address = canonical.addresses.first().cloned();
    canonical.created_at = parse_timestamp(customer.date_created.as_deref());
    canonical.updated_at = parse_timestamp(customer.date_modified.as_deref());

    canonical
}

// =============================================================================
// Inventory
// =============================================================================

/// Flatten a product into per-SKU inventory snapshots.
///
/// Multi-variant products enumerate inventory per variant; simple products
/// emit one product-level snapshot.
pub fn convert_inventory(product: &BcProduct) -> Vec<CanonicalInventory> {
    if product.variants.is_empty() {
        let mut snapshot = CanonicalInventory::new(
            Platform::Bigcommerce,
            product.sku.clone().unwrap_or_default(),
        );
        snapshot.quantity = product.inventory_level.unwrap_or(0).max(0);
        return vec![snapshot];
    }

    product
        .variants
        .iter()
        .map(|variant| {
            let mut snapshot = CanonicalInventory::new(
                Platform::Bigcommerce,
                variant.sku.clone().unwrap_or_default(),
            );
            snapshot.quantity = variant.inventory_level.unwrap_or(0).max(0);
            snapshot
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status_id: i64) -> BcOrder {
        BcOrder {
            id: 118,
            status_id: Some(status_id),
            customer_id: Some(7),
            date_created: Some("Tue, 20 Nov 2012 00:00:00 +0000".to_string()),
            date_modified: None,
            subtotal_ex_tax: Some("100.0000".to_string()),
            total_inc_tax: Some("113.2500".to_string()),
            total_tax: Some("8.2500".to_string()),
            shipping_cost_ex_tax: Some("5.0000".to_string()),
            discount_amount: Some("0.0000".to_string()),
            coupon_discount: Some("0.0000".to_string()),
            currency_code: Some("USD".to_string()),
            staff_notes: None,
            billing_address: None,
        }
    }

    #[test]
    fn test_completed_maps_to_fulfilled() {
        // status_id 10 is "Completed"
        assert_eq!(
            map_fulfillment_status(Some(10)),
            FulfillmentStatus::Fulfilled
        );
        assert_eq!(map_financial_status(Some(10)), FinancialStatus::Paid);
    }

    #[test]
    fn test_unknown_status_id_is_conservative() {
        assert_eq!(
            map_fulfillment_status(Some(999)),
            FulfillmentStatus::Unfulfilled
        );
        assert_eq!(map_financial_status(Some(999)), FinancialStatus::Pending);
        assert_eq!(map_fulfillment_status(None), FulfillmentStatus::Unfulfilled);
    }

    #[test]
    fn test_refunded_and_cancelled() {
        assert_eq!(map_financial_status(Some(4)), FinancialStatus::Refunded);
        assert_eq!(map_financial_status(Some(14)), FinancialStatus::Refunded);
        assert_eq!(map_fulfillment_status(Some(5)), FulfillmentStatus::Cancelled);
        assert_eq!(map_financial_status(Some(5)), FinancialStatus::Voided);
    }

    #[test]
    fn test_convert_order_parses_v2_dates_and_money() {
        let canonical = convert_order(&order(10), &[], None, "abc123");
        assert_eq!(
            canonical.created_at.expect("created").to_rfc3339(),
            "2012-11-20T00:00:00+00:00"
        );
        assert_eq!(
            canonical.total_price,
            "113.25".parse::<Decimal>().expect("dec")
        );
        assert!(canonical.totals_reconcile(tidemark_core::RECONCILE_TOLERANCE));
    }

    #[test]
    fn test_line_item_without_tax() {
        let item = BcOrderProduct {
            id: 5,
            product_id: Some(77),
            variant_id: None,
            name: Some("Mug".to_string()),
            sku: Some("MUG-01".to_string()),
            quantity: Some(2),
            price_ex_tax: Some("10.00".to_string()),
            total_ex_tax: Some("20.00".to_string()),
            total_tax: None,
            applied_discounts: vec![],
        };
        let canonical = convert_line_item(&item);
        assert_eq!(canonical.tax, Decimal::ZERO);
        assert!(canonical.total_reconciles(tidemark_core::RECONCILE_TOLERANCE));
    }

    #[test]
    fn test_multi_variant_inventory_enumerated_per_variant() {
        let product = BcProduct {
            id: 9,
            name: Some("Tee".to_string()),
            sku: Some("TEE".to_string()),
            description: None,
            brand_name: None,
            price: Some(25.0),
            cost_price: None,
            retail_price: None,
            inventory_level: Some(0),
            is_visible: Some(true),
            availability: None,
            page_title: None,
            meta_description: None,
            date_created: None,
            date_modified: None,
            variants: vec![
                super::super::types::BcVariant {
                    id: 91,
                    sku: Some("TEE-S".to_string()),
                    price: None,
                    calculated_price: Some(25.0),
                    inventory_level: Some(4),
                    option_values: vec![],
                    image_url: None,
                },
                super::super::types::BcVariant {
                    id: 92,
                    sku: Some("TEE-M".to_string()),
                    price: None,
                    calculated_price: Some(25.0),
                    inventory_level: Some(6),
                    option_values: vec![],
                    image_url: None,
                },
            ],
            images: vec![],
        };

        let snapshots = convert_inventory(&product);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].sku, "TEE-S");
        assert_eq!(snapshots[0].quantity, 4);
        assert_eq!(snapshots[1].quantity, 6);

        // And the product-level quantity is the variant sum
        let canonical = convert_product(&product, "abc123");
        assert_eq!(canonical.inventory_quantity, 10);
    }
}
