//! Fixed-point price and quantity conversions.
//!
//! Prices and quantities are `u64` scaled by 10^8, giving 8 decimal places
//! without any floating-point rounding in comparisons. Decimal strings only
//! appear at the edges (demo output, parsing user input) and go through
//! `rust_decimal`.
//!
//! ```
//! use limit_book::types::price::{format_fixed, parse_fixed};
//!
//! let price = parse_fixed("100.25").unwrap();
//! assert_eq!(price, 10_025_000_000);
//! assert_eq!(format_fixed(price), "100.25000000");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::types::error::{BookError, BookResult};

/// Scaling factor for fixed-point values: 10^8
pub const SCALE: u64 = 100_000_000;

/// Number of decimal places carried by [`SCALE`]
pub const SCALE_DIGITS: u32 = 8;

/// Parse a decimal string into a fixed-point value.
///
/// Extra digits beyond 8 decimal places are rounded (banker's rounding).
///
/// # Errors
///
/// [`BookError::InvalidDecimal`] if the string is not a number, is negative
/// or does not fit in a `u64` after scaling.
pub fn parse_fixed(s: &str) -> BookResult<u64> {
    let decimal = Decimal::from_str(s.trim())
        .map_err(|e| BookError::InvalidDecimal(format!("{s:?}: {e}")))?;
    from_decimal(decimal)
}

/// Convert a `Decimal` into a fixed-point value.
pub fn from_decimal(d: Decimal) -> BookResult<u64> {
    if d.is_sign_negative() && !d.is_zero() {
        return Err(BookError::InvalidDecimal(format!("{d} is negative")));
    }

    d.checked_mul(Decimal::from(SCALE))
        .map(|scaled| scaled.round_dp(0))
        .and_then(|rounded| rounded.to_u64())
        .ok_or_else(|| BookError::InvalidDecimal(format!("{d} is out of range")))
}

/// Convert a fixed-point value into a `Decimal` carrying 8 decimal places.
pub fn to_decimal(value: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(value), SCALE_DIGITS)
}

/// Format a fixed-point value with exactly 8 decimal places.
pub fn format_fixed(value: u64) -> String {
    format!("{:.8}", to_decimal(value))
}

/// Format a fixed-point value without trailing zeros.
pub fn format_fixed_trimmed(value: u64) -> String {
    to_decimal(value).normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed() {
        assert_eq!(parse_fixed("1"), Ok(100_000_000));
        assert_eq!(parse_fixed("0.5"), Ok(50_000_000));
        assert_eq!(parse_fixed("0.00000001"), Ok(1));
        assert_eq!(parse_fixed(" 105.0 "), Ok(10_500_000_000));
        assert_eq!(parse_fixed("0"), Ok(0));
    }

    #[test]
    fn test_parse_fixed_rejects() {
        assert!(matches!(parse_fixed("-1.0"), Err(BookError::InvalidDecimal(_))));
        assert!(matches!(parse_fixed("abc"), Err(BookError::InvalidDecimal(_))));
        assert!(matches!(parse_fixed(""), Err(BookError::InvalidDecimal(_))));
        // u64::MAX / SCALE is roughly 184 billion
        assert!(matches!(parse_fixed("200000000000"), Err(BookError::InvalidDecimal(_))));
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(100_000_000), "1.00000000");
        assert_eq!(format_fixed(1), "0.00000001");
        assert_eq!(format_fixed(0), "0.00000000");
        assert_eq!(format_fixed(10_025_000_000), "100.25000000");
    }

    #[test]
    fn test_format_fixed_trimmed() {
        assert_eq!(format_fixed_trimmed(100_000_000), "1");
        assert_eq!(format_fixed_trimmed(150_000_000), "1.5");
        assert_eq!(format_fixed_trimmed(123_456_789), "1.23456789");
    }

    #[test]
    fn test_precision_is_kept() {
        let fixed = parse_fixed("123456789.12345678").unwrap();
        assert_eq!(format_fixed(fixed), "123456789.12345678");
    }
}
