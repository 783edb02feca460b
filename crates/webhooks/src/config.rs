//! Webhook service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `WEBHOOKS_HOST` - Bind address (default: 127.0.0.1)
//! - `WEBHOOKS_PORT` - Listen port (default: 3100)
//!
//! ## Per-platform shared secrets (configure the platforms in use)
//! - `AMAZON_WEBHOOK_SECRET`
//! - `BIGCOMMERCE_WEBHOOK_SECRET`
//! - `WOOCOMMERCE_WEBHOOK_SECRET`
//! - `EBAY_WEBHOOK_SECRET`
//!
//! A platform without a configured secret cannot be verified; its
//! deliveries are rejected with 401.

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use tidemark_core::Platform;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Webhook service configuration.
///
/// Implements `Debug` manually to redact the shared secrets.
#[derive(Clone)]
pub struct WebhooksConfig {
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Per-platform webhook shared secrets.
    pub amazon_secret: Option<SecretString>,
    /// BigCommerce shared secret.
    pub bigcommerce_secret: Option<SecretString>,
    /// WooCommerce delivery secret.
    pub woocommerce_secret: Option<SecretString>,
    /// eBay shared secret.
    pub ebay_secret: Option<SecretString>,
}

impl std::fmt::Debug for WebhooksConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &Option<SecretString>| s.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("WebhooksConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("amazon_secret", &redact(&self.amazon_secret))
            .field("bigcommerce_secret", &redact(&self.bigcommerce_secret))
            .field("woocommerce_secret", &redact(&self.woocommerce_secret))
            .field("ebay_secret", &redact(&self.ebay_secret))
            .finish()
    }
}

impl WebhooksConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the bind address or port is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("WEBHOOKS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("WEBHOOKS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("WEBHOOKS_PORT", "3100")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("WEBHOOKS_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            amazon_secret: get_optional_secret("AMAZON_WEBHOOK_SECRET"),
            bigcommerce_secret: get_optional_secret("BIGCOMMERCE_WEBHOOK_SECRET"),
            woocommerce_secret: get_optional_secret("WOOCOMMERCE_WEBHOOK_SECRET"),
            ebay_secret: get_optional_secret("EBAY_WEBHOOK_SECRET"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The shared secret for one platform, when configured.
    #[must_use]
    pub const fn secret_for(&self, platform: Platform) -> Option<&SecretString> {
        match platform {
            Platform::Amazon => self.amazon_secret.as_ref(),
            Platform::Bigcommerce => self.bigcommerce_secret.as_ref(),
            Platform::Woocommerce => self.woocommerce_secret.as_ref(),
            Platform::Ebay => self.ebay_secret.as_ref(),
        }
    }
}

/// Get an optional environment variable as a secret.
fn get_optional_secret(key: &str) -> Option<SecretString> {
    std::env::var(key).ok().map(SecretString::from)
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WebhooksConfig {
        WebhooksConfig {
            host: "127.0.0.1".parse().expect("ip"),
            port: 3100,
            amazon_secret: Some(SecretString::from("amazon-secret-value")),
            bigcommerce_secret: None,
            woocommerce_secret: Some(SecretString::from("woo-secret-value")),
            ebay_secret: None,
        }
    }

    #[test]
    fn test_secret_lookup_per_platform() {
        let config = config();
        assert!(config.secret_for(Platform::Amazon).is_some());
        assert!(config.secret_for(Platform::Bigcommerce).is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", config());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("amazon-secret-value"));
        assert!(!debug.contains("woo-secret-value"));
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.port(), 3100);
    }
}
