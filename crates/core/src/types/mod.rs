//! Canonical entity types.
//!
//! Every entity serializes to JSON using the field names defined here; this
//! is the contract consumed by the storage layer and UI and must remain
//! stable across adapter implementations.

mod address;
mod customer;
mod inventory;
mod order;
mod platform;
mod product;
mod webhook;

pub use address::CanonicalAddress;
pub use customer::{CanonicalCustomer, CustomerSegment, SegmentThresholds};
pub use inventory::CanonicalInventory;
pub use order::{
    CanonicalLineItem, CanonicalOrder, FinancialStatus, FulfillmentStatus, OrderCustomer,
    RECONCILE_TOLERANCE, TrackingInfo,
};
pub use platform::{ConnectionState, Platform, PlatformParseError};
pub use product::{CanonicalProduct, CanonicalVariant, ProductImage, ProductStatus, SeoFields};
pub use webhook::{
    CanonicalWebhookEvent, ComplianceRecord, ComplianceStatus, WebhookEventStatus, WebhookTopic,
};
