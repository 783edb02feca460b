//! Route definitions for the webhook service.

mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the webhook routes with their inbound rate limiter.
pub fn routes() -> Router<AppState> {
    webhooks::router().layer(crate::middleware::webhook_rate_limiter())
}
