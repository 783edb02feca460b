//! Platform identity and connection lifecycle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported e-commerce platforms.
///
/// Entity identity throughout the canonical model is the pair
/// (platform, platform-native id); ids are never compared across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Amazon Selling Partner API.
    Amazon,
    /// BigCommerce v2/v3 REST API.
    Bigcommerce,
    /// WooCommerce REST API (self-hosted WordPress).
    Woocommerce,
    /// eBay Sell APIs.
    Ebay,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Self; 4] = [Self::Amazon, Self::Bigcommerce, Self::Woocommerce, Self::Ebay];

    /// Stable lowercase identifier used in URLs and serialized data.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amazon => "amazon",
            Self::Bigcommerce => "bigcommerce",
            Self::Woocommerce => "woocommerce",
            Self::Ebay => "ebay",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown platform identifier.
#[derive(Debug, Error)]
#[error("unknown platform: {0}")]
pub struct PlatformParseError(pub String);

impl std::str::FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amazon" => Ok(Self::Amazon),
            "bigcommerce" => Ok(Self::Bigcommerce),
            "woocommerce" => Ok(Self::Woocommerce),
            "ebay" => Ok(Self::Ebay),
            other => Err(PlatformParseError(other.to_string())),
        }
    }
}

/// Lifecycle state of a platform connection.
///
/// Transitions: `Pending -> Connected | Error`; `Connected -> Disconnected`
/// on revoke; `Error` is recoverable by re-running the connection test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Credentials configured but not yet verified.
    #[default]
    Pending,
    /// Connection test succeeded; adapter is usable.
    Connected,
    /// Credentials revoked by the merchant.
    Disconnected,
    /// Last connection test failed.
    Error,
}

impl ConnectionState {
    /// Whether a transition to `next` is allowed from this state.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Connected | Self::Error)
                | (Self::Connected, Self::Disconnected)
                | (Self::Error, Self::Pending | Self::Connected | Self::Error)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.as_str().parse().expect("parse back");
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn test_platform_unknown() {
        assert!("shopify".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde_snake_case() {
        let json = serde_json::to_string(&Platform::Bigcommerce).expect("serialize");
        assert_eq!(json, "\"bigcommerce\"");
    }

    #[test]
    fn test_connection_state_transitions() {
        assert!(ConnectionState::Pending.can_transition_to(ConnectionState::Connected));
        assert!(ConnectionState::Pending.can_transition_to(ConnectionState::Error));
        assert!(ConnectionState::Connected.can_transition_to(ConnectionState::Disconnected));
        // Error is recoverable by re-running the connection test
        assert!(ConnectionState::Error.can_transition_to(ConnectionState::Connected));
        // Revoked connections stay revoked
        assert!(!ConnectionState::Disconnected.can_transition_to(ConnectionState::Connected));
    }
}
