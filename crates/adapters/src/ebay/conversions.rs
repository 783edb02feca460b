//! Mapping from eBay Sell API payloads to the canonical model.

use rust_decimal::Decimal;
use tidemark_core::{
    CanonicalAddress, CanonicalInventory, CanonicalLineItem, CanonicalOrder, CanonicalProduct,
    FinancialStatus, FulfillmentStatus, OrderCustomer, Platform, ProductImage, ProductStatus,
};

use crate::mapping::{clamp_quantity, parse_money, parse_timestamp};

use super::types::{EbAmount, EbInventoryItem, EbLineItem, EbOrder};

// =============================================================================
// Status Tables
// =============================================================================

/// Map eBay fulfillment/cancel state to canonical fulfillment.
///
/// A cancelled order wins over whatever the fulfillment field says; unknown
/// codes fall back to `Unfulfilled`.
pub fn map_fulfillment_status(
    fulfillment: Option<&str>,
    cancel_state: Option<&str>,
) -> FulfillmentStatus {
    if cancel_state == Some("CANCELED") {
        return FulfillmentStatus::Cancelled;
    }
    match fulfillment {
        Some("FULFILLED") => FulfillmentStatus::Fulfilled,
        Some("IN_PROGRESS") => FulfillmentStatus::Partial,
        // NOT_STARTED, unknown
        _ => FulfillmentStatus::Unfulfilled,
    }
}

/// Map eBay payment/cancel state to canonical financial status. Unknown
/// codes fall back to `Pending`.
pub fn map_financial_status(
    payment: Option<&str>,
    cancel_state: Option<&str>,
) -> FinancialStatus {
    match payment {
        Some("PAID") => {
            if cancel_state == Some("CANCELED") {
                FinancialStatus::Voided
            } else {
                FinancialStatus::Paid
            }
        }
        Some("FULLY_REFUNDED" | "PARTIALLY_REFUNDED") => FinancialStatus::Refunded,
        Some("FAILED") if cancel_state == Some("CANCELED") => FinancialStatus::Voided,
        // PENDING, FAILED, unknown
        _ => FinancialStatus::Pending,
    }
}

// =============================================================================
// Orders
// =============================================================================

fn amount(value: Option<&EbAmount>) -> Decimal {
    parse_money(value.and_then(|a| a.value.as_deref()))
}

/// Map an order; eBay inlines line items and the ship-to address.
pub fn convert_order(order: &EbOrder) -> CanonicalOrder {
    let mut canonical = CanonicalOrder::new(Platform::Ebay, order.order_id.clone());
    let cancel_state = order
        .cancel_status
        .as_ref()
        .and_then(|c| c.cancel_state.as_deref());

    canonical.order_number = Some(order.order_id.clone());

    let registration = order
        .buyer
        .as_ref()
        .and_then(|b| b.buyer_registration_address.as_ref());
    canonical.customer = OrderCustomer {
        platform_id: order.buyer.as_ref().and_then(|b| b.username.clone()),
        email: registration.and_then(|r| r.email.clone()),
        first_name: registration.and_then(|r| r.full_name.clone()),
        last_name: None,
        phone: registration
            .and_then(|r| r.primary_phone.as_ref())
            .and_then(|p| p.phone_number.clone()),
    };
    canonical.line_items = order.line_items.iter().map(convert_line_item).collect();

    let pricing = order.pricing_summary.as_ref();
    if let Some(currency) = pricing
        .and_then(|p| p.total.as_ref())
        .and_then(|t| t.currency.clone())
    {
        canonical.currency_code = currency;
    }
    canonical.subtotal_price = amount(pricing.and_then(|p| p.price_subtotal.as_ref()));
    canonical.total_tax = amount(pricing.and_then(|p| p.tax.as_ref()));
    canonical.total_shipping = amount(pricing.and_then(|p| p.delivery_cost.as_ref()));
    canonical.total_discounts = amount(pricing.and_then(|p| p.price_discount.as_ref()));
    canonical.total_price = amount(pricing.and_then(|p| p.total.as_ref()));

    canonical.financial_status =
        map_financial_status(order.order_payment_status.as_deref(), cancel_state);
    canonical.fulfillment_status =
        map_fulfillment_status(order.order_fulfillment_status.as_deref(), cancel_state);
    canonical.shipping_address = convert_ship_to(order);
    canonical.created_at = parse_timestamp(order.creation_date.as_deref());
    canonical.updated_at = parse_timestamp(order.last_modified_date.as_deref());
    canonical.platform_url = Some(format!(
        "https://www.ebay.com/sh/ord/details?orderid={}",
        order.order_id
    ));

    canonical
}

fn convert_line_item(item: &EbLineItem) -> CanonicalLineItem {
    let quantity = clamp_quantity(item.quantity.unwrap_or(1));
    let unit_cost = amount(item.line_item_cost.as_ref());
    let total = amount(item.total.as_ref());
    let gross = unit_cost * Decimal::from(quantity);

    CanonicalLineItem {
        platform_id: item.line_item_id.clone(),
        product_id: item.legacy_item_id.clone(),
        variant_id: None,
        sku: item.sku.clone().filter(|s| !s.is_empty()),
        title: item.title.clone().unwrap_or_default(),
        quantity,
        price: unit_cost,
        // eBay reports no per-line discount; derive it from the gap
        total_discount: (gross - total).max(Decimal::ZERO),
        tax: item
            .taxes
            .iter()
            .map(|t| amount(t.amount.as_ref()))
            .sum(),
        total_price: total,
    }
}

fn convert_ship_to(order: &EbOrder) -> Option<CanonicalAddress> {
    let ship_to = order
        .fulfillment_start_instructions
        .first()?
        .shipping_step
        .as_ref()?
        .ship_to
        .as_ref()?;
    let contact = ship_to.contact_address.as_ref();

    let (first_name, last_name) = ship_to.full_name.as_deref().map_or((None, None), |name| {
        match name.split_once(' ') {
            Some((first, last)) => (Some(first.to_string()), Some(last.to_string())),
            None => (Some(name.to_string()), None),
        }
    });

    Some(CanonicalAddress {
        address1: contact.and_then(|c| c.address_line1.clone()),
        address2: contact.and_then(|c| c.address_line2.clone()),
        city: contact.and_then(|c| c.city.clone()),
        province_code: contact.and_then(|c| c.state_or_province.clone()),
        country_code: contact.and_then(|c| c.country_code.clone()),
        zip: contact.and_then(|c| c.postal_code.clone()),
        first_name,
        last_name,
        company: None,
        phone: ship_to
            .primary_phone
            .as_ref()
            .and_then(|p| p.phone_number.clone()),
    })
}

// =============================================================================
// Products / Inventory
// =============================================================================

/// Map an inventory item to a canonical product.
///
/// The SKU doubles as the platform identity - the Inventory API keys
/// everything by it. Pricing lives on offers; `price` stays zero unless an
/// offer was fetched alongside.
pub fn convert_product(item: &EbInventoryItem, offer_price: Option<&EbAmount>) -> CanonicalProduct {
    let mut product = CanonicalProduct::new(Platform::Ebay, item.sku.clone());

    product.sku = Some(item.sku.clone());
    product.title = item
        .product
        .as_ref()
        .and_then(|p| p.title.clone())
        .unwrap_or_default();
    product.description = item
        .product
        .as_ref()
        .and_then(|p| p.description.clone())
        .unwrap_or_default();
    if let Some(price) = offer_price {
        product.price = parse_money(price.value.as_deref());
        if let Some(currency) = price.currency.clone() {
            product.currency_code = currency;
        }
    }
    product.inventory_quantity = quantity_of(item);
    product.images = item
        .product
        .as_ref()
        .map(|p| {
            p.image_urls
                .iter()
                .enumerate()
                .map(|(index, url)| ProductImage {
                    platform_id: None,
                    url: url.clone(),
                    alt_text: None,
                    position: i64::try_from(index).ok().map(|i| i + 1),
                })
                .collect()
        })
        .unwrap_or_default();
    product.status = if product.inventory_quantity > 0 {
        ProductStatus::Active
    } else {
        ProductStatus::Draft
    };

    product
}

/// Map an inventory item to a canonical stock snapshot.
pub fn convert_inventory(item: &EbInventoryItem) -> CanonicalInventory {
    let mut inventory = CanonicalInventory::new(Platform::Ebay, item.sku.clone());
    inventory.quantity = quantity_of(item);
    inventory
}

// =============================================================================
// From-canonical Mapping
// =============================================================================

/// Inventory item payload for creating an item from a canonical product.
///
/// PUT on the Inventory API is create-or-replace, which keeps retries
/// idempotent.
pub fn inventory_item_payload(product: &CanonicalProduct) -> serde_json::Value {
    serde_json::json!({
        "product": {
            "title": product.title,
            "description": product.description,
            "imageUrls": product.images.iter().map(|i| i.url.clone()).collect::<Vec<_>>(),
        },
        "condition": "NEW",
        "availability": {
            "shipToLocationAvailability": { "quantity": product.inventory_quantity.max(0) },
        },
    })
}

fn quantity_of(item: &EbInventoryItem) -> i64 {
    item.availability
        .as_ref()
        .and_then(|a| a.ship_to_location_availability.as_ref())
        .and_then(|s| s.quantity)
        .unwrap_or(0)
        .max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount_of(value: &str) -> EbAmount {
        EbAmount {
            value: Some(value.to_string()),
            currency: Some("USD".to_string()),
        }
    }

    #[test]
    fn test_fulfillment_status_table() {
        assert_eq!(
            map_fulfillment_status(Some("FULFILLED"), None),
            FulfillmentStatus::Fulfilled
        );
        assert_eq!(
            map_fulfillment_status(Some("IN_PROGRESS"), None),
            FulfillmentStatus::Partial
        );
        assert_eq!(
            map_fulfillment_status(Some("NOT_STARTED"), None),
            FulfillmentStatus::Unfulfilled
        );
        assert_eq!(
            map_fulfillment_status(Some("SOMETHING_NEW"), None),
            FulfillmentStatus::Unfulfilled
        );
    }

    #[test]
    fn test_cancel_state_wins() {
        assert_eq!(
            map_fulfillment_status(Some("FULFILLED"), Some("CANCELED")),
            FulfillmentStatus::Cancelled
        );
        assert_eq!(
            map_financial_status(Some("PAID"), Some("CANCELED")),
            FinancialStatus::Voided
        );
    }

    #[test]
    fn test_financial_status_table() {
        assert_eq!(map_financial_status(Some("PAID"), None), FinancialStatus::Paid);
        assert_eq!(
            map_financial_status(Some("PARTIALLY_REFUNDED"), None),
            FinancialStatus::Refunded
        );
        assert_eq!(
            map_financial_status(Some("PENDING"), None),
            FinancialStatus::Pending
        );
        assert_eq!(map_financial_status(None, None), FinancialStatus::Pending);
    }

    #[test]
    fn test_line_item_discount_derived() {
        let item = EbLineItem {
            line_item_id: "li-1".to_string(),
            legacy_item_id: Some("1102233".to_string()),
            sku: Some("CAM-01".to_string()),
            title: Some("Camera".to_string()),
            quantity: Some(2),
            line_item_cost: Some(amount_of("50.00")),
            total: Some(amount_of("90.00")),
            taxes: vec![],
        };
        let canonical = convert_line_item(&item);
        assert_eq!(canonical.price, Decimal::from(50));
        assert_eq!(canonical.total_discount, Decimal::from(10));
        assert!(canonical.total_reconciles(tidemark_core::RECONCILE_TOLERANCE));
    }

    #[test]
    fn test_product_sku_is_platform_identity() {
        let item = EbInventoryItem {
            sku: "CAM-01".to_string(),
            product: None,
            availability: None,
        };
        let product = convert_product(&item, None);
        assert_eq!(product.platform_id, "CAM-01");
        assert_eq!(product.sku.as_deref(), Some("CAM-01"));
        assert_eq!(product.price, Decimal::ZERO);
    }
}
