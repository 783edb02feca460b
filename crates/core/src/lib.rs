//! Tidemark Core - Canonical commerce data model.
//!
//! This crate defines the platform-neutral schema that every adapter
//! produces and consumes:
//! - `adapters` - Per-platform API clients mapping native payloads into this model
//! - `webhooks` - Inbound event ingestion normalizing notifications into this model
//!
//! # Architecture
//!
//! The core crate contains only types and pure derived computations - no I/O,
//! no HTTP clients, no async. Canonical instances are created fresh on every
//! mapping call; mutation happens only by re-mapping, so transformation is a
//! pure, idempotent function of the raw platform input.
//!
//! # Modules
//!
//! - [`types`] - Canonical entities, status enums, and derived values

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
