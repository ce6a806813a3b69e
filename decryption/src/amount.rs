//! Fixed 6-decimal amount formatting.

use fundraising_primitives::{AMOUNT_DECIMALS, AMOUNT_SCALE};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("invalid character in amount")]
    InvalidDigit,
    #[error("more than 6 decimal places")]
    TooManyDecimals,
    #[error("amount exceeds 64 bits")]
    Overflow,
}

/// Render base units as a decimal string: `1500000 -> "1.5"`, `2000000 -> "2.0"`.
/// Trailing zeros are trimmed but one fractional digit is always kept.
pub fn format_amount(base_units: u64) -> String {
    let whole = base_units / AMOUNT_SCALE;
    let frac = base_units % AMOUNT_SCALE;
    let frac = format!("{:0width$}", frac, width = AMOUNT_DECIMALS as usize);
    let trimmed = frac.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Parse a decimal string into base units: `"1.5" -> 1500000`.
pub fn parse_amount(input: &str) -> Result<u64, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    let (whole, frac) = input.split_once('.').unwrap_or((input, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Empty);
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(AmountError::InvalidDigit);
    }
    if frac.len() > AMOUNT_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals);
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = AMOUNT_DECIMALS as usize)
            .parse()
            .map_err(|_| AmountError::InvalidDigit)?
    };

    whole
        .checked_mul(AMOUNT_SCALE)
        .and_then(|w| w.checked_add(frac))
        .ok_or(AmountError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_ethers() {
        assert_eq!(format_amount(1_500_000), "1.5");
        assert_eq!(format_amount(2_000_000), "2.0");
        assert_eq!(format_amount(10_000_000), "10.0");
        assert_eq!(format_amount(0), "0.0");
        assert_eq!(format_amount(1), "0.000001");
        assert_eq!(format_amount(123_456_789), "123.456789");
    }

    #[test]
    fn parses_decimal_strings() {
        assert_eq!(parse_amount("1.5"), Ok(1_500_000));
        assert_eq!(parse_amount("2"), Ok(2_000_000));
        assert_eq!(parse_amount(" 0.000001 "), Ok(1));
        assert_eq!(parse_amount(".25"), Ok(250_000));
        assert_eq!(parse_amount("3."), Ok(3_000_000));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("."), Err(AmountError::Empty));
        assert_eq!(parse_amount("-1"), Err(AmountError::InvalidDigit));
        assert_eq!(parse_amount("1.2.3"), Err(AmountError::InvalidDigit));
        assert_eq!(parse_amount("1e6"), Err(AmountError::InvalidDigit));
        assert_eq!(parse_amount("0.0000001"), Err(AmountError::TooManyDecimals));
        assert_eq!(parse_amount("18446744073709.551616"), Err(AmountError::Overflow));
    }

    #[test]
    fn format_then_parse_is_identity_on_samples() {
        for v in [0, 1, 999_999, 1_000_000, 1_500_000, u64::MAX] {
            assert_eq!(parse_amount(&format_amount(v)), Ok(v));
        }
    }
}
