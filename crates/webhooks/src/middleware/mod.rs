//! HTTP middleware for the webhook service.

mod rate_limit;
mod request_id;

pub use rate_limit::{ForwardedIpKeyExtractor, webhook_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
