//! Unified error taxonomy for platform adapters.

use thiserror::Error;
use tidemark_core::Platform;

/// Errors surfaced by adapter operations.
///
/// Adapter methods let these propagate to the caller with an identifiable
/// kind and a descriptive message; they never swallow errors into empty
/// results.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Missing, expired, or invalid credential.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The platform lacks this capability. A declared gap, not a bug -
    /// callers should consult the adapter's capability set first.
    #[error("{platform} does not support {operation}")]
    UnsupportedOperation {
        /// Platform that lacks the capability.
        platform: Platform,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// HTTP 429 persisted through the single transport retry.
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds the platform asked us to wait.
        retry_after_secs: u64,
    },

    /// Timeout or connection failure. Retryable by the caller.
    #[error("Network error: {0}")]
    Network(String),

    /// Platform returned a non-success status the transport does not
    /// handle. Carries the platform's own error message.
    #[error("Platform API error ({status}): {message}")]
    PlatformApi {
        /// HTTP status code.
        status: u16,
        /// Error body from the platform, possibly truncated.
        message: String,
    },

    /// Webhook authenticity check failed.
    #[error("Signature verification failed: {0}")]
    SignatureVerification(String),

    /// The platform responded with a payload we could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Adapter configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AdapterError {
    /// Shorthand for a declared capability gap.
    #[must_use]
    pub const fn unsupported(platform: Platform, operation: &'static str) -> Self {
        Self::UnsupportedOperation {
            platform,
            operation,
        }
    }

    /// Whether a caller may reasonably retry the failed call.
    ///
    /// Network failures and 5xx platform errors are retryable by the
    /// caller's own policy; rate limits are retryable after the reported
    /// delay. Client errors and capability gaps are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited { .. } => true,
            Self::PlatformApi { status, .. } => *status >= 500,
            Self::Authentication(_)
            | Self::UnsupportedOperation { .. }
            | Self::SignatureVerification(_)
            | Self::InvalidResponse(_)
            | Self::Configuration(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = AdapterError::unsupported(Platform::Amazon, "customer access");
        assert_eq!(err.to_string(), "amazon does not support customer access");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(AdapterError::Network("timeout".to_string()).is_retryable());
        assert!(AdapterError::RateLimited {
            retry_after_secs: 30
        }
        .is_retryable());
        assert!(AdapterError::PlatformApi {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_retryable());
        assert!(!AdapterError::PlatformApi {
            status: 404,
            message: "not found".to_string()
        }
        .is_retryable());
        assert!(!AdapterError::Authentication("expired".to_string()).is_retryable());
        assert!(!AdapterError::unsupported(Platform::Ebay, "customer access").is_retryable());
    }
}
