//! Adapter configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Each platform is optional; configure only the ones a deployment uses.
//!
//! ## Amazon (Selling Partner API)
//! - `AMAZON_REGION` - `na`, `eu`, or `fe` (default: na)
//! - `AMAZON_LWA_CLIENT_ID` - Login-with-Amazon client ID
//! - `AMAZON_LWA_CLIENT_SECRET` - Login-with-Amazon client secret
//! - `AMAZON_REFRESH_TOKEN` - Seller-authorized refresh token
//! - `AMAZON_SELLER_ID` - Selling partner ID (listings are keyed by it)
//! - `AMAZON_MARKETPLACE_ID` - Marketplace to operate in (e.g., ATVPDKIKX0DER)
//! - `AMAZON_WEBHOOK_SECRET` - Shared secret for notification signatures
//!
//! ## BigCommerce
//! - `BIGCOMMERCE_STORE_HASH` - Store hash from the API path
//! - `BIGCOMMERCE_ACCESS_TOKEN` - Pre-provisioned API account token
//! - `BIGCOMMERCE_CLIENT_ID` - App client ID (OAuth install flow)
//! - `BIGCOMMERCE_CLIENT_SECRET` - App client secret
//! - `BIGCOMMERCE_WEBHOOK_SECRET` - Shared secret for webhook signatures
//!
//! ## WooCommerce
//! - `WOOCOMMERCE_STORE_URL` - Store base URL (e.g., <https://shop.example.com>)
//! - `WOOCOMMERCE_CONSUMER_KEY` - REST API consumer key
//! - `WOOCOMMERCE_CONSUMER_SECRET` - REST API consumer secret
//! - `WOOCOMMERCE_WEBHOOK_SECRET` - Webhook delivery secret
//!
//! ## eBay
//! - `EBAY_CLIENT_ID` - OAuth client ID (App ID)
//! - `EBAY_CLIENT_SECRET` - OAuth client secret (Cert ID)
//! - `EBAY_RU_NAME` - Redirect URL name registered with the app
//! - `EBAY_REFRESH_TOKEN` - User refresh token, once authorized
//! - `EBAY_WEBHOOK_SECRET` - Shared secret for notification signatures

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

// =============================================================================
// Amazon
// =============================================================================

/// Amazon SP-API regional endpoint group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmazonRegion {
    /// North America.
    #[default]
    Na,
    /// Europe.
    Eu,
    /// Far East.
    Fe,
}

impl AmazonRegion {
    /// SP-API base URL for this region.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Na => "https://sellingpartnerapi-na.amazon.com",
            Self::Eu => "https://sellingpartnerapi-eu.amazon.com",
            Self::Fe => "https://sellingpartnerapi-fe.amazon.com",
        }
    }
}

impl std::str::FromStr for AmazonRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "na" => Ok(Self::Na),
            "eu" => Ok(Self::Eu),
            "fe" => Ok(Self::Fe),
            other => Err(format!("unknown region: {other}")),
        }
    }
}

/// Amazon Selling Partner API configuration.
///
/// Implements `Debug` manually to redact credentials.
#[derive(Clone)]
pub struct AmazonConfig {
    /// Regional endpoint group.
    pub region: AmazonRegion,
    /// Login-with-Amazon client ID.
    pub client_id: String,
    /// Login-with-Amazon client secret.
    pub client_secret: SecretString,
    /// Seller-authorized refresh token.
    pub refresh_token: SecretString,
    /// Selling partner ID.
    pub seller_id: String,
    /// Marketplace ID to scope calls to.
    pub marketplace_id: String,
    /// Shared secret for notification signature verification.
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for AmazonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmazonConfig")
            .field("region", &self.region)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("seller_id", &self.seller_id)
            .field("marketplace_id", &self.marketplace_id)
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

impl AmazonConfig {
    /// Load from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or the
    /// region is unrecognized.
    pub fn from_env() -> Result<Self, ConfigError> {
        let region = get_env_or_default("AMAZON_REGION", "na")
            .parse::<AmazonRegion>()
            .map_err(|e| ConfigError::InvalidEnvVar("AMAZON_REGION".to_string(), e))?;

        Ok(Self {
            region,
            client_id: get_required_env("AMAZON_LWA_CLIENT_ID")?,
            client_secret: get_required_secret("AMAZON_LWA_CLIENT_SECRET")?,
            refresh_token: get_required_secret("AMAZON_REFRESH_TOKEN")?,
            seller_id: get_required_env("AMAZON_SELLER_ID")?,
            marketplace_id: get_required_env("AMAZON_MARKETPLACE_ID")?,
            webhook_secret: get_required_secret("AMAZON_WEBHOOK_SECRET")?,
        })
    }
}

// =============================================================================
// BigCommerce
// =============================================================================

/// BigCommerce API configuration.
///
/// Implements `Debug` manually to redact credentials.
#[derive(Clone)]
pub struct BigcommerceConfig {
    /// Store hash from the API path.
    pub store_hash: String,
    /// Pre-provisioned API account token.
    pub access_token: SecretString,
    /// App client ID for the OAuth install flow.
    pub client_id: String,
    /// App client secret.
    pub client_secret: SecretString,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for BigcommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigcommerceConfig")
            .field("store_hash", &self.store_hash)
            .field("access_token", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

impl BigcommerceConfig {
    /// Load from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store_hash: get_required_env("BIGCOMMERCE_STORE_HASH")?,
            access_token: get_required_secret("BIGCOMMERCE_ACCESS_TOKEN")?,
            client_id: get_required_env("BIGCOMMERCE_CLIENT_ID")?,
            client_secret: get_required_secret("BIGCOMMERCE_CLIENT_SECRET")?,
            webhook_secret: get_required_secret("BIGCOMMERCE_WEBHOOK_SECRET")?,
        })
    }
}

// =============================================================================
// WooCommerce
// =============================================================================

/// WooCommerce API configuration.
///
/// Implements `Debug` manually to redact credentials.
#[derive(Clone)]
pub struct WoocommerceConfig {
    /// Store base URL, without a trailing slash.
    pub store_url: String,
    /// REST API consumer key.
    pub consumer_key: String,
    /// REST API consumer secret.
    pub consumer_secret: SecretString,
    /// Webhook delivery secret.
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for WoocommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WoocommerceConfig")
            .field("store_url", &self.store_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

impl WoocommerceConfig {
    /// Load from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or the store
    /// URL is not HTTPS.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_url = get_required_env("WOOCOMMERCE_STORE_URL")?;
        // Key-pair auth travels in headers; plain HTTP would leak it
        if !store_url.starts_with("https://") {
            return Err(ConfigError::InvalidEnvVar(
                "WOOCOMMERCE_STORE_URL".to_string(),
                "must be an https:// URL".to_string(),
            ));
        }

        Ok(Self {
            store_url: store_url.trim_end_matches('/').to_string(),
            consumer_key: get_required_env("WOOCOMMERCE_CONSUMER_KEY")?,
            consumer_secret: get_required_secret("WOOCOMMERCE_CONSUMER_SECRET")?,
            webhook_secret: get_required_secret("WOOCOMMERCE_WEBHOOK_SECRET")?,
        })
    }
}

// =============================================================================
// eBay
// =============================================================================

/// eBay Sell API configuration.
///
/// Implements `Debug` manually to redact credentials.
#[derive(Clone)]
pub struct EbayConfig {
    /// OAuth client ID (App ID).
    pub client_id: String,
    /// OAuth client secret (Cert ID).
    pub client_secret: SecretString,
    /// Redirect URL name (`RuName`) registered with the app; eBay requires
    /// it in both the consent URL and the code exchange.
    pub ru_name: String,
    /// User refresh token, present once a seller has authorized the app.
    pub refresh_token: Option<SecretString>,
    /// Shared secret for notification signature verification.
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for EbayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EbayConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("ru_name", &self.ru_name)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

impl EbayConfig {
    /// Load from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("EBAY_CLIENT_ID")?,
            client_secret: get_required_secret("EBAY_CLIENT_SECRET")?,
            ru_name: get_required_env("EBAY_RU_NAME")?,
            refresh_token: get_optional_env("EBAY_REFRESH_TOKEN").map(SecretString::from),
            webhook_secret: get_required_secret("EBAY_WEBHOOK_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amazon_region_endpoints() {
        assert_eq!(
            AmazonRegion::Na.endpoint(),
            "https://sellingpartnerapi-na.amazon.com"
        );
        assert_eq!(
            AmazonRegion::Eu.endpoint(),
            "https://sellingpartnerapi-eu.amazon.com"
        );
        assert!("jp".parse::<AmazonRegion>().is_err());
    }

    #[test]
    fn test_amazon_config_debug_redacts_secrets() {
        let config = AmazonConfig {
            region: AmazonRegion::Na,
            client_id: "amzn1.application-oa2-client.abc".to_string(),
            client_secret: SecretString::from("lwa-secret-value"),
            refresh_token: SecretString::from("Atzr|refresh-value"),
            seller_id: "A2SELLER123".to_string(),
            marketplace_id: "ATVPDKIKX0DER".to_string(),
            webhook_secret: SecretString::from("hook-secret-value"),
        };

        let debug = format!("{config:?}");
        assert!(debug.contains("ATVPDKIKX0DER"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("lwa-secret-value"));
        assert!(!debug.contains("Atzr|refresh-value"));
        assert!(!debug.contains("hook-secret-value"));
    }

    #[test]
    fn test_woocommerce_config_debug_redacts_secrets() {
        let config = WoocommerceConfig {
            store_url: "https://shop.example.com".to_string(),
            consumer_key: "ck_abc123".to_string(),
            consumer_secret: SecretString::from("cs_secret_value"),
            webhook_secret: SecretString::from("wh_secret_value"),
        };

        let debug = format!("{config:?}");
        assert!(debug.contains("shop.example.com"));
        assert!(!debug.contains("cs_secret_value"));
        assert!(!debug.contains("wh_secret_value"));
    }
}
