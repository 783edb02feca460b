//! Webhook signature primitives shared by adapters and the ingestion service.
//!
//! Every supported platform signs webhook deliveries with HMAC-SHA256 over
//! the raw, unparsed request body using a per-platform shared secret. The
//! digest travels base64-encoded in a platform-specific header.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AdapterError;

type HmacSha256 = Hmac<Sha256>;

/// Compute the base64-encoded HMAC-SHA256 of `body` under `secret`.
#[must_use]
pub fn hmac_base64(secret: &[u8], body: &[u8]) -> String {
    use base64::Engine as _;

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify a base64 HMAC-SHA256 signature over the raw body.
///
/// # Errors
///
/// Returns `AdapterError::SignatureVerification` when the provided value
/// does not match the computed digest. The comparison is constant-time.
pub fn verify_hmac_base64(
    secret: &[u8],
    body: &[u8],
    provided: &str,
) -> Result<(), AdapterError> {
    let expected = hmac_base64(secret, body);
    if constant_time_compare(&expected, provided) {
        Ok(())
    } else {
        Err(AdapterError::SignatureVerification(
            "signature mismatch".to_string(),
        ))
    }
}

/// Compare two strings in constant time.
///
/// Length differences still short-circuit; the timing channel being closed
/// is the byte-by-byte content comparison.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"tidemark-webhook-secret";

    #[test]
    fn test_correct_signature_accepted() {
        let body = br#"{"customer_id":42}"#;
        let signature = hmac_base64(SECRET, body);
        assert!(verify_hmac_base64(SECRET, body, &signature).is_ok());
    }

    #[test]
    fn test_flipped_byte_rejected() {
        let body = br#"{"customer_id":42}"#;
        let signature = hmac_base64(SECRET, body);
        let tampered = br#"{"customer_id":43}"#;
        assert!(verify_hmac_base64(SECRET, tampered, &signature).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = br#"{"customer_id":42}"#;
        let signature = hmac_base64(SECRET, body);
        assert!(verify_hmac_base64(b"other-secret", body, &signature).is_err());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
        assert!(constant_time_compare("", ""));
    }
}
