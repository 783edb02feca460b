//! Defensive parsing helpers shared by adapter conversions.
//!
//! Platforms report money and quantities as strings, floats, or not at all.
//! Mapping never fails on malformed numeric data: missing or unparseable
//! values become zero, negative money clamps to zero, and quantities clamp
//! to their domain minimum.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Parse a platform money/number string; missing or malformed becomes zero.
#[must_use]
pub fn parse_decimal(value: Option<&str>) -> Decimal {
    value
        .and_then(|s| s.trim().parse::<Decimal>().ok())
        .unwrap_or(Decimal::ZERO)
}

/// Parse a money string, clamping negatives to zero.
#[must_use]
pub fn parse_money(value: Option<&str>) -> Decimal {
    non_negative(parse_decimal(value))
}

/// Clamp a decimal to zero or above.
#[must_use]
pub fn non_negative(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::ZERO
    } else {
        value
    }
}

/// Clamp an order quantity to at least one.
#[must_use]
pub const fn clamp_quantity(value: i64) -> i64 {
    if value < 1 { 1 } else { value }
}

/// Parse a platform timestamp; malformed becomes `None`, never an error.
///
/// Accepts RFC 3339 (most platforms), RFC 2822 (BigCommerce v2), and bare
/// `YYYY-MM-DDTHH:MM:SS` read as UTC (WooCommerce `_gmt` fields).
#[must_use]
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let s = value?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(s).or_else(|_| DateTime::parse_from_rfc2822(s)) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_defensive() {
        assert_eq!(parse_decimal(Some("12.34")), "12.34".parse().expect("dec"));
        assert_eq!(parse_decimal(Some(" 5 ")), Decimal::from(5));
        assert_eq!(parse_decimal(Some("not-a-number")), Decimal::ZERO);
        assert_eq!(parse_decimal(Some("")), Decimal::ZERO);
        assert_eq!(parse_decimal(None), Decimal::ZERO);
    }

    #[test]
    fn test_parse_money_clamps_negative() {
        assert_eq!(parse_money(Some("-3.50")), Decimal::ZERO);
        assert_eq!(parse_money(Some("3.50")), "3.50".parse().expect("dec"));
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(-4), 1);
        assert_eq!(clamp_quantity(7), 7);
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp(Some("2026-03-01T12:30:00Z")).expect("timestamp");
        assert_eq!(ts.to_rfc3339(), "2026-03-01T12:30:00+00:00");
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }

    #[test]
    fn test_parse_timestamp_rfc2822() {
        let ts = parse_timestamp(Some("Tue, 20 Nov 2012 00:00:00 +0000")).expect("timestamp");
        assert_eq!(ts.to_rfc3339(), "2012-11-20T00:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_naive_gmt() {
        let ts = parse_timestamp(Some("2017-03-22T16:28:02")).expect("timestamp");
        assert_eq!(ts.to_rfc3339(), "2017-03-22T16:28:02+00:00");
    }
}
