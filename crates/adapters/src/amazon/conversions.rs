//! Mapping from SP-API payloads to the canonical model.
//!
//! All functions here are pure: the same raw payload always maps to the
//! same canonical instance.

use tidemark_core::{
    CanonicalAddress, CanonicalInventory, CanonicalLineItem, CanonicalOrder, CanonicalProduct,
    FinancialStatus, FulfillmentStatus, OrderCustomer, Platform, ProductImage, ProductStatus,
};

use crate::mapping::{clamp_quantity, parse_money, parse_timestamp};

use super::types::{
    InventorySummary, ListingsItem, SpAddress, SpMoney, SpOrder, SpOrderItem,
};

// =============================================================================
// Status Tables
// =============================================================================

/// Map an Amazon `OrderStatus` to canonical fulfillment.
///
/// Codes absent from the table fall back to `Unfulfilled` - never to
/// `Fulfilled`.
pub fn map_fulfillment_status(status: Option<&str>) -> FulfillmentStatus {
    match status {
        Some("Shipped") => FulfillmentStatus::Fulfilled,
        Some("PartiallyShipped") => FulfillmentStatus::Partial,
        Some("Canceled" | "Unfulfillable") => FulfillmentStatus::Cancelled,
        // Pending, PendingAvailability, Unshipped, InvoiceUnconfirmed,
        // and anything Amazon adds later
        _ => FulfillmentStatus::Unfulfilled,
    }
}

/// Map an Amazon `OrderStatus` to canonical financial status.
///
/// Amazon charges at shipment, so only shipped orders are `Paid`; unknown
/// codes fall back to `Pending`.
pub fn map_financial_status(status: Option<&str>) -> FinancialStatus {
    match status {
        Some("Shipped" | "PartiallyShipped" | "InvoiceUnconfirmed") => FinancialStatus::Paid,
        Some("Canceled") => FinancialStatus::Voided,
        _ => FinancialStatus::Pending,
    }
}

// =============================================================================
// Orders
// =============================================================================

fn money_amount(money: Option<&SpMoney>) -> rust_decimal::Decimal {
    parse_money(money.and_then(|m| m.amount.as_deref()))
}

fn money_currency(money: Option<&SpMoney>) -> Option<String> {
    money.and_then(|m| m.currency_code.clone())
}

/// Map an order plus its separately fetched line items.
pub fn convert_order(order: &SpOrder, items: &[SpOrderItem]) -> CanonicalOrder {
    let mut canonical = CanonicalOrder::new(Platform::Amazon, order.amazon_order_id.clone());

    canonical.order_number = Some(order.amazon_order_id.clone());
    canonical.customer = OrderCustomer {
        platform_id: None,
        email: order
            .buyer_info
            .as_ref()
            .and_then(|b| b.buyer_email.clone()),
        first_name: order.buyer_info.as_ref().and_then(|b| b.buyer_name.clone()),
        last_name: None,
        phone: order
            .shipping_address
            .as_ref()
            .and_then(|a| a.phone.clone()),
    };
    canonical.line_items = items.iter().map(convert_line_item).collect();

    if let Some(currency) = money_currency(order.order_total.as_ref()) {
        canonical.currency_code = currency;
    }
    canonical.total_price = money_amount(order.order_total.as_ref());
    canonical.total_tax = canonical.line_items.iter().map(|i| i.tax).sum();
    canonical.total_discounts = canonical
        .line_items
        .iter()
        .map(|i| i.total_discount)
        .sum();
    // Gross of discounts: line totals are net, so add the discounts back
    canonical.subtotal_price = canonical
        .line_items
        .iter()
        .map(|i| i.total_price + i.total_discount)
        .sum();

    canonical.financial_status = map_financial_status(order.order_status.as_deref());
    canonical.fulfillment_status = map_fulfillment_status(order.order_status.as_deref());
    canonical.shipping_address = order.shipping_address.as_ref().map(convert_address);
    canonical.created_at = parse_timestamp(order.purchase_date.as_deref());
    canonical.updated_at = parse_timestamp(order.last_update_date.as_deref());
    canonical.platform_url = Some(format!(
        "https://sellercentral.amazon.com/orders-v3/order/{}",
        order.amazon_order_id
    ));

    canonical
}

/// Map a line item. `ItemPrice` is the line total; the canonical unit price
/// is derived from it.
pub fn convert_line_item(item: &SpOrderItem) -> CanonicalLineItem {
    let quantity = clamp_quantity(item.quantity_ordered.unwrap_or(1));
    let line_total = money_amount(item.item_price.as_ref());
    let discount = money_amount(item.promotion_discount.as_ref());

    CanonicalLineItem {
        platform_id: item.order_item_id.clone(),
        // ASIN is the platform-assigned identity; SellerSKU stays in the
        // merchant SKU namespace
        product_id: item.asin.clone(),
        variant_id: None,
        sku: item.seller_sku.clone(),
        title: item.title.clone().unwrap_or_default(),
        quantity,
        price: line_total / rust_decimal::Decimal::from(quantity),
        total_discount: discount,
        // Zero when Amazon omits per-item tax
        tax: money_amount(item.item_tax.as_ref()),
        total_price: line_total - discount,
    }
}

fn convert_address(address: &SpAddress) -> CanonicalAddress {
    // Amazon reports a single Name; split off a best-effort first name
    let (first_name, last_name) = address.name.as_deref().map_or((None, None), |name| {
        match name.split_once(' ') {
            Some((first, last)) => (Some(first.to_string()), Some(last.to_string())),
            None => (Some(name.to_string()), None),
        }
    });

    CanonicalAddress {
        address1: address.address_line1.clone(),
        address2: address.address_line2.clone(),
        city: address.city.clone(),
        province_code: address.state_or_region.clone(),
        country_code: address.country_code.clone(),
        zip: address.postal_code.clone(),
        first_name,
        last_name,
        company: None,
        phone: address.phone.clone(),
    }
}

// =============================================================================
// Products
// =============================================================================

/// Map a listings item to a canonical product.
///
/// Amazon listings have no variant tree; each SKU is its own listing, so
/// the canonical product carries no variants and the listing's SKU.
pub fn convert_product(item: &ListingsItem, marketplace_id: &str) -> CanonicalProduct {
    let summary = item.summaries.first();
    let asin = summary
        .and_then(|s| s.asin.clone())
        .unwrap_or_else(|| item.sku.clone());

    let mut product = CanonicalProduct::new(Platform::Amazon, asin.clone());
    product.sku = Some(item.sku.clone());
    product.title = summary
        .and_then(|s| s.item_name.clone())
        .unwrap_or_default();
    product.status = summary.map_or(ProductStatus::Draft, |s| {
        map_listing_status(&s.status)
    });

    if let Some(offer) = item.offers.first()
        && let Some(price) = &offer.price
    {
        product.price = parse_money(price.amount.as_deref());
        if let Some(currency) = &price.currency_code {
            product.currency_code = currency.clone();
        }
    }

    if let Some(link) = summary
        .and_then(|s| s.main_image.as_ref())
        .and_then(|i| i.link.clone())
    {
        product.images.push(ProductImage {
            platform_id: None,
            url: link,
            alt_text: None,
            position: Some(1),
        });
    }

    product.created_at = parse_timestamp(summary.and_then(|s| s.created_date.as_deref()));
    product.updated_at = parse_timestamp(summary.and_then(|s| s.last_updated_date.as_deref()));
    product.platform_url = Some(format!(
        "https://sellercentral.amazon.com/myinventory/inventory?sku={}&marketplace={marketplace_id}",
        item.sku
    ));

    product
}

/// Map listings status flags to the canonical lifecycle.
fn map_listing_status(status: &[String]) -> ProductStatus {
    if status.iter().any(|s| s == "DISCOVERABLE" || s == "BUYABLE") {
        ProductStatus::Active
    } else {
        ProductStatus::Draft
    }
}

// =============================================================================
// From-canonical Mapping
// =============================================================================

/// Listings attributes for creating a listing from a canonical product.
pub fn listing_attributes(product: &CanonicalProduct) -> serde_json::Value {
    serde_json::json!({
        "item_name": [{"value": product.title}],
        "product_description": [{"value": product.description}],
        "purchasable_offer": [{
            "currency": product.currency_code,
            "our_price": [{"schedule": [{"value_with_tax": product.price.to_string()}]}],
        }],
    })
}

/// Listings patch operations for updating a listing from a canonical
/// product.
pub fn listing_patches(product: &CanonicalProduct) -> serde_json::Value {
    serde_json::json!([
        {
            "op": "replace",
            "path": "/attributes/item_name",
            "value": [{"value": product.title}],
        },
        {
            "op": "replace",
            "path": "/attributes/purchasable_offer",
            "value": [{
                "currency": product.currency_code,
                "our_price": [{"schedule": [{"value_with_tax": product.price.to_string()}]}],
            }],
        },
    ])
}

// =============================================================================
// Inventory
// =============================================================================

/// Map an FBA inventory summary to a canonical snapshot.
pub fn convert_inventory(summary: &InventorySummary) -> CanonicalInventory {
    let sku = summary.seller_sku.clone().unwrap_or_default();
    let mut inventory = CanonicalInventory::new(Platform::Amazon, sku);

    inventory.quantity = summary.total_quantity.unwrap_or(0).max(0);
    if let Some(details) = &summary.inventory_details {
        inventory.reserved_quantity = details
            .reserved_quantity
            .as_ref()
            .and_then(|r| r.total_reserved_quantity)
            .unwrap_or(0)
            .max(0);
        inventory.incoming_quantity = details.inbound_working_quantity.unwrap_or(0).max(0);
    }

    inventory
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn money(amount: &str) -> SpMoney {
        SpMoney {
            currency_code: Some("USD".to_string()),
            amount: Some(amount.to_string()),
        }
    }

    fn order_item(quantity: i64, total: &str) -> SpOrderItem {
        SpOrderItem {
            order_item_id: "item-1".to_string(),
            asin: Some("B07XJ8C8F5".to_string()),
            seller_sku: Some("TIDE-001".to_string()),
            title: Some("Widget".to_string()),
            quantity_ordered: Some(quantity),
            item_price: Some(money(total)),
            item_tax: None,
            promotion_discount: None,
        }
    }

    #[test]
    fn test_partially_shipped_maps_to_partial() {
        assert_eq!(
            map_fulfillment_status(Some("PartiallyShipped")),
            FulfillmentStatus::Partial
        );
    }

    #[test]
    fn test_unknown_status_is_conservative() {
        assert_eq!(
            map_fulfillment_status(Some("SomeFutureStatus")),
            FulfillmentStatus::Unfulfilled
        );
        assert_eq!(map_fulfillment_status(None), FulfillmentStatus::Unfulfilled);
        assert_eq!(map_financial_status(Some("???")), FinancialStatus::Pending);
    }

    #[test]
    fn test_shipped_is_fulfilled_and_paid() {
        assert_eq!(
            map_fulfillment_status(Some("Shipped")),
            FulfillmentStatus::Fulfilled
        );
        assert_eq!(map_financial_status(Some("Shipped")), FinancialStatus::Paid);
    }

    #[test]
    fn test_line_item_unit_price_derived_from_total() {
        let item = convert_line_item(&order_item(4, "20.00"));
        assert_eq!(item.price, Decimal::from(5));
        assert_eq!(item.total_price, Decimal::from(20));
        assert_eq!(item.quantity, 4);
        // Per-item tax omitted by the platform maps to zero, not an error
        assert_eq!(item.tax, Decimal::ZERO);
    }

    #[test]
    fn test_line_item_asin_and_sku_stay_distinct() {
        let item = convert_line_item(&order_item(1, "5.00"));
        assert_eq!(item.product_id.as_deref(), Some("B07XJ8C8F5"));
        assert_eq!(item.sku.as_deref(), Some("TIDE-001"));
    }

    #[test]
    fn test_convert_order_is_idempotent() {
        let order = SpOrder {
            amazon_order_id: "113-0001".to_string(),
            purchase_date: Some("2026-02-01T10:00:00Z".to_string()),
            last_update_date: None,
            order_status: Some("PartiallyShipped".to_string()),
            order_total: Some(money("40.00")),
            buyer_info: None,
            shipping_address: None,
        };
        let items = vec![order_item(2, "40.00")];

        let first = convert_order(&order, &items);
        let second = convert_order(&order, &items);
        assert_eq!(first, second);
        assert_eq!(first.fulfillment_status, FulfillmentStatus::Partial);
        assert_eq!(first.total_price, Decimal::from(40));
    }

    #[test]
    fn test_malformed_money_maps_to_zero() {
        let mut item = order_item(1, "not-money");
        item.item_price = Some(SpMoney {
            currency_code: None,
            amount: Some("not-money".to_string()),
        });
        let converted = convert_line_item(&item);
        assert_eq!(converted.price, Decimal::ZERO);
        assert_eq!(converted.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_inventory_clamps_negative_platform_data() {
        let summary = InventorySummary {
            seller_sku: Some("TIDE-001".to_string()),
            total_quantity: Some(-3),
            inventory_details: None,
        };
        assert_eq!(convert_inventory(&summary).quantity, 0);
    }
}
