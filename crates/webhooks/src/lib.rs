//! Tidemark Webhooks - Inbound platform event ingestion.
//!
//! Accepts `POST /webhooks/{platform}` notifications, authenticates them
//! with the platform's HMAC signature over the raw body, normalizes them
//! into canonical webhook events, and persists compliance-topic requests as
//! auditable records.
//!
//! # Acknowledgement Contract
//!
//! Unverifiable requests are rejected with 401 before any parsing. Once a
//! request is verified, the handler acknowledges with 200 even when internal
//! processing fails - failures are recorded on the stored event and retried
//! out-of-band, never via the platform's webhook retry transport.
//!
//! # Architecture
//!
//! Handlers are stateless and single-shot; the only cross-invocation state
//! is the durable store behind the [`store::EventStore`] and
//! [`store::ComplianceStore`] boundary traits.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use axum::routing::get;

pub mod config;
pub mod error;
pub mod middleware;
pub mod normalize;
pub mod processor;
pub mod routes;
pub mod state;
pub mod store;

use state::AppState;

/// Build the service router.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
