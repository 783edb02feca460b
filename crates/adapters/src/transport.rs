//! Rate-limited HTTP transport shared by every adapter.
//!
//! This is the single place that knows HTTP-429 semantics: on a rate-limit
//! response the transport reads `Retry-After` (or falls back to the
//! per-platform minimum delay, since some platforms rate-limit without
//! per-response headers), waits, and retries exactly once. Adapters must
//! not duplicate retry logic.

use std::time::Duration;

use tidemark_core::Platform;
use tracing::{instrument, warn};

use crate::error::AdapterError;

/// Client-level deadline for every outbound call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on error body text carried into [`AdapterError::PlatformApi`].
const MAX_ERROR_BODY: usize = 2048;

/// Rate-limited HTTP transport for one platform connection.
pub struct Transport {
    client: reqwest::Client,
    platform: Platform,
    /// Fallback delay when a 429 carries no `Retry-After` header.
    min_retry_delay: Duration,
}

impl Transport {
    /// Create a transport with the platform's minimum retry delay.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(platform: Platform, min_retry_delay: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            platform,
            min_retry_delay,
        }
    }

    /// The underlying HTTP client, for building requests.
    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Execute a request, absorbing at most one rate-limit round.
    ///
    /// Success statuses return the response for the adapter to parse.
    ///
    /// # Errors
    ///
    /// - `RateLimited` when a 429 persists through the single retry
    /// - `Network` on timeout or connection failure (retryable by caller)
    /// - `Authentication` on 401/403
    /// - `PlatformApi` for any other 4xx/5xx; 5xx are retryable by the
    ///   caller's own policy, never automatically here
    #[instrument(skip(self, request), fields(platform = %self.platform))]
    pub async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AdapterError> {
        // Clone up front; bodies built from JSON are always cloneable.
        let retry_request = request.try_clone();

        let response = request.send().await.map_err(map_send_error)?;

        if response.status() != reqwest::StatusCode::TOO_MANY_REQUESTS {
            return self.check_status(response).await;
        }

        let delay = retry_after(&response).unwrap_or(self.min_retry_delay);
        let Some(retry_request) = retry_request else {
            return Err(AdapterError::RateLimited {
                retry_after_secs: delay.as_secs(),
            });
        };

        warn!(
            platform = %self.platform,
            delay_secs = delay.as_secs(),
            "Rate limited, retrying once"
        );
        tokio::time::sleep(delay).await;

        let response = retry_request.send().await.map_err(map_send_error)?;
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = retry_after(&response).unwrap_or(self.min_retry_delay).as_secs();
            return Err(AdapterError::RateLimited { retry_after_secs });
        }

        self.check_status(response).await
    }

    /// Map non-success statuses into the error taxonomy.
    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AdapterError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let mut message = response.text().await.unwrap_or_default();
        message.truncate(MAX_ERROR_BODY);

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AdapterError::Authentication(format!(
                "{} rejected credentials: {message}",
                self.platform
            )));
        }

        Err(AdapterError::PlatformApi {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("platform", &self.platform)
            .field("min_retry_delay", &self.min_retry_delay)
            .finish_non_exhaustive()
    }
}

/// Read a `Retry-After` delay in seconds from a 429 response.
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Map reqwest send failures to the error taxonomy.
fn map_send_error(err: reqwest::Error) -> AdapterError {
    if err.is_timeout() {
        AdapterError::Network(format!("request deadline exceeded: {err}"))
    } else if err.is_connect() {
        AdapterError::Network(format!("connection failed: {err}"))
    } else {
        AdapterError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_debug_omits_client() {
        let transport = Transport::new(Platform::Amazon, Duration::from_secs(2));
        let debug = format!("{transport:?}");
        assert!(debug.contains("amazon"));
        assert!(debug.contains("min_retry_delay"));
    }
}
