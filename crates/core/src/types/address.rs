//! Mailing addresses.

use serde::{Deserialize, Serialize};

/// Mailing address as reported by a platform.
///
/// Every field is optional - platforms disagree about which parts of an
/// address are required, and partial addresses must survive mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalAddress {
    /// First line of the address.
    #[serde(default)]
    pub address1: Option<String>,
    /// Second line of the address.
    #[serde(default)]
    pub address2: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Province or state code.
    #[serde(default)]
    pub province_code: Option<String>,
    /// Country code (ISO 3166-1 alpha-2).
    #[serde(default)]
    pub country_code: Option<String>,
    /// Postal/ZIP code.
    #[serde(default)]
    pub zip: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Company name.
    #[serde(default)]
    pub company: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
}
