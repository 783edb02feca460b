//! OAuth token caching with single-flight refresh.

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use crate::error::AdapterError;

/// Refresh when a token expires within this many seconds.
const EXPIRY_WINDOW_SECS: i64 = 60;

/// An OAuth access token with optional refresh token.
#[derive(Clone)]
pub struct OAuthToken {
    /// Bearer token for API requests.
    pub access_token: SecretString,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: Option<SecretString>,
    /// Unix timestamp when the access token expires.
    pub expires_at: i64,
}

impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl OAuthToken {
    /// Build a token from an exchange/refresh response.
    #[must_use]
    pub fn from_response(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        Self {
            access_token: SecretString::from(access_token),
            refresh_token: refresh_token.map(SecretString::from),
            expires_at: chrono::Utc::now().timestamp() + expires_in,
        }
    }

    /// Whether the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_within(0)
    }

    /// Whether the token expires within `secs` seconds.
    #[must_use]
    pub fn expires_within(&self, secs: i64) -> bool {
        chrono::Utc::now().timestamp() + secs >= self.expires_at
    }

    /// Expose the access token for an Authorization header.
    #[must_use]
    pub fn bearer(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// In-memory token cache serializing refresh per credential set.
///
/// The slot mutex is held across the refresh future, so concurrent calls
/// that discover an expired token coordinate: one refresh request is issued
/// and every waiter reuses its result. This prevents refresh storms and the
/// invalidated-token races that platforms with single-use refresh tokens
/// punish.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<OAuthToken>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::const_new(None),
        }
    }

    /// Store a token directly (e.g., after an authorization-code exchange).
    pub async fn set(&self, token: OAuthToken) {
        *self.slot.lock().await = Some(token);
    }

    /// Get the cached token, if any, without refreshing.
    pub async fn current(&self) -> Option<OAuthToken> {
        self.slot.lock().await.clone()
    }

    /// Clear the cached token.
    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }

    /// Return a valid token, running `refresh` at most once per expiry.
    ///
    /// # Errors
    ///
    /// Propagates the error from `refresh`; the cached slot is left
    /// untouched so a later call can retry.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<OAuthToken, AdapterError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<OAuthToken, AdapterError>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.as_ref()
            && !token.expires_within(EXPIRY_WINDOW_SECS)
        {
            return Ok(token.clone());
        }

        // Lock is held across the await: waiters queue here and observe the
        // refreshed slot instead of issuing their own refresh request.
        let refreshed = refresh().await?;
        *slot = Some(refreshed.clone());
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn token(expires_in: i64) -> OAuthToken {
        OAuthToken::from_response("atzr|access".to_string(), None, expires_in)
    }

    #[tokio::test]
    async fn test_fresh_token_skips_refresh() {
        let cache = TokenCache::new();
        cache.set(token(3600)).await;

        let result = cache
            .get_or_refresh(|| async { panic!("refresh must not run for a fresh token") })
            .await
            .expect("cached token");
        assert!(!result.is_expired());
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_single_flight() {
        let cache = Arc::new(TokenCache::new());
        cache.set(token(-10)).await;
        let refreshes = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let refreshes = Arc::clone(&refreshes);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(|| async move {
                        refreshes.fetch_add(1, Ordering::SeqCst);
                        Ok(token(3600))
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("refresh result");
        }

        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_slot_retryable() {
        let cache = TokenCache::new();

        let err = cache
            .get_or_refresh(|| async {
                Err(AdapterError::Authentication("refresh rejected".to_string()))
            })
            .await
            .expect_err("refresh failure propagates");
        assert!(matches!(err, AdapterError::Authentication(_)));

        // A later call may still refresh successfully
        let result = cache
            .get_or_refresh(|| async { Ok(token(3600)) })
            .await
            .expect("second refresh");
        assert!(!result.is_expired());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let t = OAuthToken::from_response(
            "atzr|secret-access".to_string(),
            Some("rtzr|secret-refresh".to_string()),
            3600,
        );
        let debug = format!("{t:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }
}
