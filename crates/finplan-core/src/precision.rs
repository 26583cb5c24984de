//! Decimal arithmetic shared by every engine.
//!
//! All intermediate arithmetic runs at full `Decimal` precision; divisions are
//! pinned to [`INTERNAL_SCALE`] fractional digits and results are rounded to
//! [`DISPLAY_SCALE`] only when they leave an engine.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::{Money, Percent, Rate};

/// Fractional digits kept by divisions and reciprocals.
pub const INTERNAL_SCALE: u32 = 10;

/// Fractional digits of every monetary figure handed back to callers.
pub const DISPLAY_SCALE: u32 = 2;

/// Balances below one unit of currency count as fully repaid / exhausted.
pub const ROUNDING_EPSILON: Money = dec!(1);

const HUNDRED: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// `base^exponent` for an integer exponent, `None` when the power leaves the
/// `Decimal` range.
///
/// Exponent 0 yields 1 for any base. Negative exponents return the reciprocal
/// of the positive power at [`INTERNAL_SCALE`]; that reciprocal is 0 when the
/// positive power is 0 or too large to represent.
pub fn power(base: Decimal, exponent: i64) -> Option<Decimal> {
    if exponent == 0 {
        return Some(Decimal::ONE);
    }
    let positive = power_unsigned(base, exponent.unsigned_abs());
    if exponent < 0 {
        Some(positive.map_or(Decimal::ZERO, |p| safe_divide(Decimal::ONE, p)))
    } else {
        positive
    }
}

/// Exponentiation by squaring; exact up to the 28 significant digits of `Decimal`.
fn power_unsigned(base: Decimal, mut exponent: u64) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut factor = base;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.checked_mul(factor)?;
        }
        exponent >>= 1;
        if exponent > 0 {
            factor = factor.checked_mul(factor)?;
        }
    }
    Some(result)
}

/// 12 -> 0.12
pub fn percent_to_fraction(percent: Percent) -> Rate {
    safe_divide(percent, HUNDRED)
}

/// Annual percentage to a per-month fraction: `R / 100 / 12`.
pub fn monthly_rate(annual_percent: Percent) -> Rate {
    safe_divide(percent_to_fraction(annual_percent), MONTHS_PER_YEAR)
}

/// Division with a zero-on-failure policy: a zero denominator (or an
/// overflowing quotient) yields 0 rather than an error.
pub fn safe_divide(numerator: Decimal, denominator: Decimal) -> Decimal {
    checked_divide(numerator, denominator).unwrap_or(Decimal::ZERO)
}

/// Division pinned to [`INTERNAL_SCALE`]. A zero denominator yields 0;
/// `None` only when the quotient leaves the `Decimal` range.
pub fn checked_divide(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return Some(Decimal::ZERO);
    }
    numerator
        .checked_div(denominator)
        .map(|q| q.round_dp_with_strategy(INTERNAL_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// Sum that reports `None` instead of overflowing.
pub fn checked_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// [`safe_divide`] for operands that may be absent; a missing operand yields 0.
pub fn safe_divide_opt(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Decimal {
    match (numerator, denominator) {
        (Some(n), Some(d)) => safe_divide(n, d),
        _ => Decimal::ZERO,
    }
}

/// Round half-up to 2 fractional digits, keeping a scale of exactly 2.
pub fn round2(value: Decimal) -> Decimal {
    round_to(value, DISPLAY_SCALE)
}

/// Round half-up to `dp` fractional digits, keeping a scale of exactly `dp`.
pub fn round_to(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

pub fn is_positive(value: Decimal) -> bool {
    value > Decimal::ZERO
}

/// Percentage that `part` represents of `whole` (`part * 100 / whole`), 0 when `whole` is 0.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    match part.checked_mul(HUNDRED) {
        Some(scaled) => safe_divide(scaled, whole),
        None => safe_divide(part, whole).saturating_mul(HUNDRED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_zero_exponent_is_one() {
        assert_eq!(power(dec!(1.07), 0), Some(Decimal::ONE));
        assert_eq!(power(Decimal::ZERO, 0), Some(Decimal::ONE));
    }

    #[test]
    fn test_power_positive_exponent() {
        assert_eq!(power(dec!(1.1), 2), Some(dec!(1.21)));
        assert_eq!(power(dec!(2), 10), Some(dec!(1024)));
        // 1.01^12 = 1.1268250301...
        let p = power(dec!(1.01), 12).unwrap();
        assert!((p - dec!(1.12682503)).abs() < dec!(0.00000001));
    }

    #[test]
    fn test_power_negative_exponent_is_reciprocal() {
        assert_eq!(power(dec!(2), -2), Some(dec!(0.25)));
        assert_eq!(power(dec!(1.1), -1), Some(dec!(0.9090909091)));
    }

    #[test]
    fn test_power_negative_exponent_of_zero_base() {
        assert_eq!(power(Decimal::ZERO, -3), Some(Decimal::ZERO));
    }

    #[test]
    fn test_power_out_of_range() {
        // 1.01^7000 is about 1.8e30, past Decimal::MAX (~7.9e28)
        assert_eq!(power(dec!(1.01), 7000), None);
        assert_eq!(power(dec!(1.25), 360), None);
        assert_eq!(power(dec!(1.01), i64::from(u32::MAX)), None);
        // The reciprocal of an unrepresentable power rounds to zero.
        assert_eq!(power(dec!(1.01), -7000), Some(Decimal::ZERO));
    }

    #[test]
    fn test_checked_divide_and_sum() {
        assert_eq!(checked_divide(dec!(10), Decimal::ZERO), Some(Decimal::ZERO));
        assert_eq!(checked_divide(Decimal::MAX, dec!(0.001)), None);
        assert_eq!(safe_divide(Decimal::MAX, dec!(0.001)), Decimal::ZERO);
        assert_eq!(checked_sum([dec!(1), dec!(2.5)]), Some(dec!(3.5)));
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
    }

    #[test]
    fn test_percent_to_fraction() {
        assert_eq!(percent_to_fraction(dec!(12)), dec!(0.12));
        assert_eq!(percent_to_fraction(dec!(8.5)), dec!(0.085));
    }

    #[test]
    fn test_monthly_rate_pinned_to_internal_scale() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(dec!(10)), dec!(0.0083333333));
    }

    #[test]
    fn test_safe_divide_zero_denominator() {
        assert_eq!(safe_divide(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_divide(dec!(10), dec!(4)), dec!(2.5));
    }

    #[test]
    fn test_safe_divide_missing_operand() {
        assert_eq!(safe_divide_opt(None, Some(dec!(2))), Decimal::ZERO);
        assert_eq!(safe_divide_opt(Some(dec!(2)), None), Decimal::ZERO);
        assert_eq!(safe_divide_opt(Some(dec!(3)), Some(dec!(2))), dec!(1.5));
    }

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(dec!(2.345)), dec!(2.35));
        assert_eq!(round2(dec!(-2.345)), dec!(-2.35));
        assert_eq!(round2(dec!(2.344)), dec!(2.34));
        assert_eq!(round2(dec!(12100)).to_string(), "12100.00");
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(25), dec!(200)), dec!(12.5));
        assert_eq!(percent_of(dec!(25), Decimal::ZERO), Decimal::ZERO);
        // part * 100 would overflow; the ratio is taken first instead
        assert_eq!(percent_of(Decimal::MAX, Decimal::MAX), dec!(100));
    }
}
