//! Tidemark Adapters - Platform API clients.
//!
//! Each adapter translates one e-commerce platform's REST/OAuth API into the
//! canonical model defined by `tidemark-core`:
//!
//! - [`amazon`] - Amazon Selling Partner API (LWA auth, `NextToken` paging)
//! - [`bigcommerce`] - BigCommerce v2/v3 REST API (token auth, page paging)
//! - [`woocommerce`] - WooCommerce REST API (key-pair auth, page paging)
//! - [`ebay`] - eBay Sell APIs (OAuth2, offset paging)
//!
//! # Architecture
//!
//! All adapters implement the [`contract::PlatformAdapter`] trait and declare
//! a [`contract::CapabilitySet`]; callers check capability membership instead
//! of catching "not implemented" errors. Every outbound call goes through the
//! shared [`transport::Transport`], the single place that knows HTTP-429
//! semantics. Mapping from raw platform payloads to canonical instances is a
//! pure function with no hidden state - re-running it on the same payload
//! yields the same output.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod amazon;
pub mod auth;
pub mod bigcommerce;
pub mod config;
pub mod contract;
pub mod ebay;
pub mod error;
pub mod mapping;
pub mod signature;
pub mod transport;
pub mod woocommerce;

pub use contract::{
    Capability, CapabilitySet, ConnectionInfo, FulfillmentRequest, OrderQuery, Page, PageRequest,
    PlatformAdapter, TokenResponse,
};
pub use error::AdapterError;
