//! Exact conversion between decimal ether strings and wei.
//!
//! Values never pass through floating point: amounts are parsed digit by
//! digit into a `U256` and rendered back the same way.

use alloy::primitives::U256;
use thiserror::Error;

/// Decimal places of ether.
pub const ETHER_DECIMALS: usize = 18;

/// Reasons an amount string cannot be turned into wei.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must be a plain positive decimal number")]
    Malformed,

    #[error("amount has more than 18 decimal places")]
    TooPrecise,

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("amount is too large")]
    Overflow,
}

/// Parse a decimal ether amount (e.g. `"0.01"`) into wei.
///
/// Accepts digits with at most one `.`; no sign, exponent or whitespace inside.
/// Zero is rejected, and so is anything finer than one wei.
pub fn parse_ether(input: &str) -> Result<U256, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if input.starts_with('-') {
        return Err(AmountError::NotPositive);
    }

    let (whole, fraction) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Malformed);
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountError::Malformed);
    }

    // Trailing zeros carry no precision.
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > ETHER_DECIMALS {
        return Err(AmountError::TooPrecise);
    }

    let mut digits = String::with_capacity(whole.len() + ETHER_DECIMALS);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(ETHER_DECIMALS - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Err(AmountError::NotPositive);
    }

    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow)
}

/// Render wei as decimal ether, trimming trailing zeros but keeping one
/// fractional digit (`1 ether` → `"1.0"`).
pub fn format_ether(wei: U256) -> String {
    let unit = U256::from(10u64).pow(U256::from(ETHER_DECIMALS));
    let whole = wei / unit;
    let fraction = wei % unit;

    let mut fraction = format!("{:0>width$}", fraction.to_string(), width = ETHER_DECIMALS);
    while fraction.len() > 1 && fraction.ends_with('0') {
        fraction.pop();
    }

    format!("{}.{}", whole, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(s: &str) -> U256 {
        U256::from_str_radix(s, 10).unwrap()
    }

    #[test]
    fn test_parse_common_amounts() {
        assert_eq!(parse_ether("1").unwrap(), wei("1000000000000000000"));
        assert_eq!(parse_ether("0.01").unwrap(), wei("10000000000000000"));
        assert_eq!(parse_ether(".5").unwrap(), wei("500000000000000000"));
        assert_eq!(parse_ether("2.").unwrap(), wei("2000000000000000000"));
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), U256::from(1u64));
        assert_eq!(parse_ether("1.500000000000000000000").unwrap(), wei("1500000000000000000"));
    }

    #[test]
    fn test_parse_rejects_zero_and_negative() {
        assert_eq!(parse_ether("0"), Err(AmountError::NotPositive));
        assert_eq!(parse_ether("0.000"), Err(AmountError::NotPositive));
        assert_eq!(parse_ether("-1"), Err(AmountError::NotPositive));
        assert_eq!(parse_ether("-0.5"), Err(AmountError::NotPositive));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_ether(""), Err(AmountError::Empty));
        assert_eq!(parse_ether("   "), Err(AmountError::Empty));
        assert_eq!(parse_ether("."), Err(AmountError::Malformed));
        assert_eq!(parse_ether("abc"), Err(AmountError::Malformed));
        assert_eq!(parse_ether("1e-3"), Err(AmountError::Malformed));
        assert_eq!(parse_ether("+1"), Err(AmountError::Malformed));
        assert_eq!(parse_ether("1.2.3"), Err(AmountError::Malformed));
        assert_eq!(parse_ether("NaN"), Err(AmountError::Malformed));
        assert_eq!(parse_ether("1 000"), Err(AmountError::Malformed));
    }

    #[test]
    fn test_parse_rejects_sub_wei_precision() {
        assert_eq!(parse_ether("0.0000000000000000001"), Err(AmountError::TooPrecise));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let huge = "9".repeat(80);
        assert_eq!(parse_ether(&huge), Err(AmountError::Overflow));
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(U256::ZERO), "0.0");
        assert_eq!(format_ether(wei("1000000000000000000")), "1.0");
        assert_eq!(format_ether(wei("10000000000000000")), "0.01");
        assert_eq!(format_ether(wei("1234500000000000000")), "1.2345");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
    }
}
