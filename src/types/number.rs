//! Base-unit / decimal conversion and display formatting.
//!
//! ## Overview
//!
//! Every quantity in the engine is an integer number of base units scaled by
//! a per-asset exponent. Human-readable decimals only appear at the edges:
//! parsing form input and rendering values for display.
//!
//! ## Rounding
//!
//! All conversions truncate toward zero. The ledger truncates, so anything
//! that rounds to nearest would drift from the amounts that actually settle.
//!
//! ## Examples
//!
//! ```
//! use amm_preview::types::number::{decimal_to_units, units_to_fixed};
//! use num_bigint::BigInt;
//! use rust_decimal::{Decimal, RoundingStrategy};
//! use std::str::FromStr;
//!
//! let units = decimal_to_units(Decimal::from_str("1.2345678").unwrap(), 6);
//! assert_eq!(units, BigInt::from(1_234_567));
//! assert_eq!(units_to_fixed(&units, 6, 6), "1.234567");
//! ```

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, ToPrimitive, Zero};
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits kept when a ratio is rendered as a `Decimal`.
///
/// This is the largest scale `Decimal` supports, so a ratio resolves down to
/// `1e-28` before it truncates to zero.
pub const RATIO_DECIMALS: u32 = 28;

// ============================================================================
// Powers of ten
// ============================================================================

/// `10^exp` as an unsigned big integer
pub fn pow10(exp: u32) -> BigUint {
    num_traits::pow(BigUint::from(10u8), exp as usize)
}

/// `10^exp` as a signed big integer
pub fn pow10_signed(exp: u32) -> BigInt {
    BigInt::from_biguint(Sign::Plus, pow10(exp))
}

// ============================================================================
// Decimal <-> base units
// ============================================================================

/// Convert a human decimal value to base units, truncating toward zero.
///
/// # Arguments
///
/// * `value` - Decimal value (e.g. `12.5`)
/// * `exponent` - Number of decimal places one whole unit is split into
///
/// # Example
///
/// ```
/// use amm_preview::types::number::decimal_to_units;
/// use num_bigint::BigInt;
/// use rust_decimal::Decimal;
///
/// assert_eq!(decimal_to_units(Decimal::new(125, 1), 6), BigInt::from(12_500_000));
/// assert_eq!(decimal_to_units(Decimal::new(19, 1), 0), BigInt::from(1));
/// ```
pub fn decimal_to_units(value: Decimal, exponent: u8) -> BigInt {
    let mantissa = BigInt::from(value.mantissa());
    let scale = value.scale();
    let exponent = u32::from(exponent);

    if exponent >= scale {
        mantissa * pow10_signed(exponent - scale)
    } else {
        mantissa / pow10_signed(scale - exponent)
    }
}

/// Convert base units to a `Decimal`.
///
/// Returns `None` when the value does not fit `Decimal`'s 96-bit mantissa
/// or the exponent exceeds its maximum scale of 28.
pub fn units_to_decimal(units: &BigInt, exponent: u8) -> Option<Decimal> {
    let mantissa = units.to_i128()?;
    Decimal::try_from_i128_with_scale(mantissa, u32::from(exponent)).ok()
}

/// Multiply base units by a decimal factor, truncating toward zero.
///
/// This is exact integer arithmetic: `units * mantissa / 10^scale`.
pub fn mul_decimal_trunc(units: &BigInt, factor: Decimal) -> BigInt {
    units * BigInt::from(factor.mantissa()) / pow10_signed(factor.scale())
}

/// Divide base units by a decimal divisor, truncating toward zero.
///
/// # Panics
///
/// Panics if `divisor` is zero.
pub fn div_decimal_trunc(units: &BigInt, divisor: Decimal) -> BigInt {
    assert!(!divisor.is_zero(), "division of base units by zero");
    units * pow10_signed(divisor.scale()) / BigInt::from(divisor.mantissa())
}

/// `floor(amount * rate)` for non-negative pool arithmetic.
///
/// # Panics
///
/// Panics if `rate` is negative.
pub fn mul_floor(amount: &BigUint, rate: Decimal) -> BigUint {
    assert!(!rate.is_sign_negative(), "negative rate {rate}");
    amount * BigUint::from(rate.mantissa().unsigned_abs()) / pow10(rate.scale())
}

/// Exact `numerator / denominator` truncated to [`RATIO_DECIMALS`] digits.
///
/// At this scale the quotient must stay below about `7.9` to fit the 96-bit
/// mantissa. Every caller in the engine divides a part by a whole, so the
/// result is at most one.
///
/// # Panics
///
/// Panics if `denominator` is zero or the quotient overflows `Decimal`.
pub fn ratio_to_decimal(numerator: &BigUint, denominator: &BigUint) -> Decimal {
    assert!(!denominator.is_zero(), "ratio with zero denominator");
    let scaled = numerator * pow10(RATIO_DECIMALS) / denominator;
    scaled
        .to_i128()
        .and_then(|mantissa| Decimal::try_from_i128_with_scale(mantissa, RATIO_DECIMALS).ok())
        .unwrap_or_else(|| panic!("ratio {numerator}/{denominator} overflows Decimal"))
}

/// `ratio * 100`, truncated so the product keeps every digit it can.
pub fn to_percentage(ratio: Decimal) -> Decimal {
    ratio.round_dp_with_strategy(RATIO_DECIMALS - 2, RoundingStrategy::ToZero)
        * Decimal::ONE_HUNDRED
}

// ============================================================================
// Rendering
// ============================================================================

/// Split `|units|` truncated to `decimals` places into integer and
/// fractional digit strings. The fractional part is exactly `decimals` long.
fn split_digits(units: &BigInt, exponent: u8, decimals: u32) -> (String, String) {
    let magnitude = units.magnitude();
    let exponent = u32::from(exponent);

    let (scaled, places) = if decimals >= exponent {
        (magnitude * pow10(decimals - exponent), decimals)
    } else {
        (magnitude / pow10(exponent - decimals), decimals)
    };

    let divisor = pow10(places);
    let integer = (&scaled / &divisor).to_string();
    let fraction = if places == 0 {
        String::new()
    } else {
        format!(
            "{:0>width$}",
            (&scaled % &divisor).to_string(),
            width = places as usize
        )
    };
    (integer, fraction)
}

/// Insert `,` between every group of three integer digits.
pub fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn assemble(negative: bool, integer: String, fraction: String) -> String {
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&integer);
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

/// Plain decimal text truncated to at most `decimals` places, trailing
/// zeros removed, no grouping. Suitable for re-parsing as form input.
///
/// # Example
///
/// ```
/// use amm_preview::types::number::units_to_fixed;
/// use num_bigint::BigInt;
///
/// assert_eq!(units_to_fixed(&BigInt::from(1_500_000), 6, 6), "1.5");
/// assert_eq!(units_to_fixed(&BigInt::from(1_999_999), 6, 2), "1.99");
/// assert_eq!(units_to_fixed(&BigInt::from(2_000_000), 6, 6), "2");
/// ```
pub fn units_to_fixed(units: &BigInt, exponent: u8, decimals: u32) -> String {
    let (integer, fraction) = split_digits(units, exponent, decimals);
    let fraction = fraction.trim_end_matches('0').to_owned();
    let negative = units.is_negative() && !(integer == "0" && fraction.is_empty());
    assemble(negative, integer, fraction)
}

/// Grouped decimal text with exactly `decimals` places, truncated.
///
/// # Example
///
/// ```
/// use amm_preview::types::number::units_to_grouped;
/// use num_bigint::BigInt;
///
/// assert_eq!(units_to_grouped(&BigInt::from(1_234_567_890u64), 6, 2), "1,234.56");
/// assert_eq!(units_to_grouped(&BigInt::from(5), 0, 3), "5.000");
/// ```
pub fn units_to_grouped(units: &BigInt, exponent: u8, decimals: u32) -> String {
    let (integer, fraction) = split_digits(units, exponent, decimals);
    let all_zero = integer == "0" && fraction.chars().all(|c| c == '0');
    let negative = units.is_negative() && !all_zero;
    assemble(negative, group_thousands(&integer), fraction)
}

/// Index of the first non-zero digit relative to the decimal point.
///
/// For values below one this is the number of zeros right after the point
/// (`0.00123` -> 2). For values of one or more it is minus the number of
/// integer digits (`1234.5` -> -4). Zero yields 0.
pub fn first_significant_digit_index(units: &BigInt, exponent: u8) -> i64 {
    let magnitude = units.magnitude();
    let one = pow10(u32::from(exponent));
    let integer = magnitude / &one;

    if integer.is_zero() {
        if magnitude.is_zero() {
            return 0;
        }
        let digits = magnitude.to_string().len() as i64;
        i64::from(exponent) - digits
    } else {
        -(integer.to_string().len() as i64)
    }
}

/// Compact rendering keeping `significant` significant digits, at most
/// `max_digits` decimal places, truncated and grouped.
///
/// # Example
///
/// ```
/// use amm_preview::types::number::format_to_significant_digits;
/// use num_bigint::BigInt;
///
/// // 1234.567891 -> 1 decimal keeps five significant digits
/// assert_eq!(format_to_significant_digits(&BigInt::from(1_234_567_891u64), 6, 5, 6), "1,234.5");
/// // 0.001234 -> 2 leading zeros + 5 digits, capped by the exponent
/// assert_eq!(format_to_significant_digits(&BigInt::from(1_234), 6, 5, 6), "0.001234");
/// assert_eq!(format_to_significant_digits(&BigInt::from(0), 6, 5, 6), "0");
/// ```
pub fn format_to_significant_digits(
    units: &BigInt,
    exponent: u8,
    significant: u32,
    max_digits: u32,
) -> String {
    if units.is_zero() {
        return "0".to_owned();
    }

    let index = first_significant_digit_index(units, exponent);
    let decimals = (index + i64::from(significant)).max(0).min(i64::from(max_digits));
    units_to_grouped(units, exponent, decimals as u32)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0), BigUint::from(1u8));
        assert_eq!(pow10(6), BigUint::from(1_000_000u32));
        assert_eq!(pow10(18).to_string(), "1000000000000000000");
    }

    #[test]
    fn test_decimal_to_units_truncates() {
        assert_eq!(decimal_to_units(dec!(1.2345679), 6), BigInt::from(1_234_567));
        assert_eq!(decimal_to_units(dec!(0.0000009), 6), BigInt::from(0));
        assert_eq!(decimal_to_units(dec!(-1.9), 0), BigInt::from(-1));
        assert_eq!(decimal_to_units(dec!(3), 18).to_string(), "3000000000000000000");
    }

    #[test]
    fn test_units_to_decimal() {
        assert_eq!(units_to_decimal(&BigInt::from(1_500_000), 6), Some(dec!(1.5)));
        assert_eq!(units_to_decimal(&BigInt::from(7), 0), Some(dec!(7)));
        assert_eq!(units_to_decimal(&BigInt::from(1), 29), None);
    }

    #[test]
    fn test_mul_and_div_truncate() {
        assert_eq!(mul_decimal_trunc(&BigInt::from(999), dec!(0.5)), BigInt::from(499));
        assert_eq!(mul_decimal_trunc(&BigInt::from(-999), dec!(0.5)), BigInt::from(-499));
        assert_eq!(div_decimal_trunc(&BigInt::from(10), dec!(3)), BigInt::from(3));
        assert_eq!(div_decimal_trunc(&BigInt::from(10), dec!(0.4)), BigInt::from(25));
    }

    #[test]
    #[should_panic(expected = "division of base units by zero")]
    fn test_div_by_zero_panics() {
        div_decimal_trunc(&BigInt::from(10), Decimal::ZERO);
    }

    #[test]
    fn test_mul_floor() {
        assert_eq!(mul_floor(&BigUint::from(1_000_000u32), dec!(0.02)), BigUint::from(20_000u32));
        assert_eq!(mul_floor(&BigUint::from(99u32), dec!(0.1)), BigUint::from(9u32));
        assert_eq!(mul_floor(&BigUint::from(5u32), Decimal::ZERO), BigUint::zero());
    }

    #[test]
    fn test_ratio_to_decimal() {
        let r = ratio_to_decimal(&BigUint::from(3u8), &BigUint::from(4u8));
        assert_eq!(r, dec!(0.75));
        let third = ratio_to_decimal(&BigUint::from(1u8), &BigUint::from(3u8));
        assert_eq!(third, dec!(0.3333333333333333333333333333));
        let tiny = ratio_to_decimal(&BigUint::from(1u8), &pow10(27));
        assert_eq!(tiny, dec!(0.0000000000000000000000000010));
        assert!(ratio_to_decimal(&BigUint::from(1u8), &pow10(29)).is_zero());
    }

    #[test]
    fn test_to_percentage() {
        assert_eq!(to_percentage(dec!(0.75)), dec!(75));
        let third = ratio_to_decimal(&BigUint::from(1u8), &BigUint::from(3u8));
        assert_eq!(to_percentage(third), dec!(33.333333333333333333333333));
    }

    #[test]
    #[should_panic(expected = "overflows Decimal")]
    fn test_ratio_to_decimal_overflow_panics() {
        ratio_to_decimal(&BigUint::from(8u8), &BigUint::from(1u8));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn test_units_to_fixed() {
        assert_eq!(units_to_fixed(&BigInt::from(0), 6, 6), "0");
        assert_eq!(units_to_fixed(&BigInt::from(1), 6, 6), "0.000001");
        assert_eq!(units_to_fixed(&BigInt::from(1), 6, 3), "0");
        assert_eq!(units_to_fixed(&BigInt::from(-1_500_000), 6, 6), "-1.5");
        assert_eq!(units_to_fixed(&BigInt::from(-1), 6, 3), "0");
    }

    #[test]
    fn test_units_to_grouped() {
        assert_eq!(units_to_grouped(&BigInt::from(0), 6, 6), "0.000000");
        assert_eq!(units_to_grouped(&BigInt::from(1_000_000_000_000u64), 6, 2), "1,000,000.00");
        assert_eq!(units_to_grouped(&BigInt::from(-2_500_000), 6, 1), "-2.5");
        assert_eq!(units_to_grouped(&BigInt::from(1234), 0, 0), "1,234");
    }

    #[test]
    fn test_first_significant_digit_index() {
        assert_eq!(first_significant_digit_index(&BigInt::from(1_230), 6), 2);
        assert_eq!(first_significant_digit_index(&BigInt::from(500_000), 6), 0);
        assert_eq!(first_significant_digit_index(&BigInt::from(1_234_500_000u64), 6), -4);
        assert_eq!(first_significant_digit_index(&BigInt::from(0), 6), 0);
    }

    #[test]
    fn test_format_to_significant_digits() {
        // 12.3456789 -> -2 + 5 = 3 decimals
        assert_eq!(format_to_significant_digits(&BigInt::from(12_345_678), 6, 5, 6), "12.345");
        // 1,234,567.8 -> never negative decimals
        assert_eq!(
            format_to_significant_digits(&BigInt::from(1_234_567_800_000u64), 6, 5, 6),
            "1,234,567"
        );
        // 0.5 -> 5 decimals
        assert_eq!(format_to_significant_digits(&BigInt::from(500_000), 6, 5, 6), "0.50000");
        // exponent 0 caps decimals at zero
        assert_eq!(format_to_significant_digits(&BigInt::from(42), 0, 5, 0), "42");
    }
}
