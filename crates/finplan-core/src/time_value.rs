//! Growth and annuity formulas shared by the loan, savings and retirement engines.
//!
//! Rates come in as annual percentages. Lump-sum growth compounds once per
//! year; annuities compound monthly at `R / 100 / 12`. Non-positive amounts or
//! period counts short-circuit to zero. Every formula returns `None` when an
//! intermediate value leaves the `Decimal` range, so callers can reject the
//! scenario instead of panicking.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::precision::{
    checked_divide, is_positive, monthly_rate, percent_to_fraction, power, round2, safe_divide,
};
use crate::types::{Money, Percent, Rate};

/// Future Value: `FV = PV * (1 + r)^t`, `t` truncated to whole years.
pub fn future_value(present_value: Money, annual_percent: Percent, years: Decimal) -> Option<Money> {
    if !is_positive(present_value) || years < Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    let periods = years.trunc().to_i64().unwrap_or(0);
    let factor = power(Decimal::ONE + percent_to_fraction(annual_percent), periods)?;
    present_value.checked_mul(factor)
}

/// Present Value: `PV = FV / (1 + r)^t`, via the future value of one unit.
pub fn present_value(
    future_value_amount: Money,
    annual_percent: Percent,
    years: Decimal,
) -> Option<Money> {
    if !is_positive(future_value_amount) {
        return Some(Decimal::ZERO);
    }
    let growth_of_one = future_value(Decimal::ONE, annual_percent, years)?;
    checked_divide(future_value_amount, growth_of_one)
}

/// Value of `current` after `years` of inflation at `inflation_percent`.
pub fn inflate(current: Money, inflation_percent: Percent, years: u32) -> Option<Money> {
    future_value(current, inflation_percent, Decimal::from(years))
}

/// Future value of `months` level monthly deposits:
/// `PMT * ((1 + r)^N - 1) / r`, or `PMT * N` at a zero rate.
pub fn annuity_future_value(payment: Money, annual_percent: Percent, months: u32) -> Option<Money> {
    if !is_positive(payment) || months == 0 {
        return Some(Decimal::ZERO);
    }
    let r = monthly_rate(annual_percent);
    if r.is_zero() {
        return payment.checked_mul(Decimal::from(months));
    }
    let growth = power(Decimal::ONE + r, i64::from(months))?;
    payment.checked_mul(checked_divide(growth - Decimal::ONE, r)?)
}

/// Corpus needed today to fund `months` level monthly withdrawals:
/// `PMT * (1 - (1 + r)^-N) / r`, or `PMT * N` at a zero rate.
pub fn annuity_present_value(payment: Money, annual_percent: Percent, months: u32) -> Option<Money> {
    if !is_positive(payment) || months == 0 {
        return Some(Decimal::ZERO);
    }
    let r = monthly_rate(annual_percent);
    if r.is_zero() {
        return payment.checked_mul(Decimal::from(months));
    }
    let discount = power(Decimal::ONE + r, -i64::from(months))?;
    payment.checked_mul(checked_divide(Decimal::ONE - discount, r)?)
}

/// Level monthly deposit that accumulates to `target` over `months`
/// (the annuity future value solved for the payment):
/// `target * r / ((1 + r)^N - 1)`, or `target / N` at a zero rate.
pub fn payment_for_future_value(target: Money, annual_percent: Percent, months: u32) -> Option<Money> {
    if !is_positive(target) || months == 0 {
        return Some(Decimal::ZERO);
    }
    let r = monthly_rate(annual_percent);
    if r.is_zero() {
        return Some(safe_divide(target, Decimal::from(months)));
    }
    let growth = power(Decimal::ONE + r, i64::from(months))?;
    checked_divide(target.checked_mul(r)?, growth - Decimal::ONE)
}

/// Equated monthly installment on an annual percentage rate, rounded to 2 dp.
pub fn emi(principal: Money, annual_percent: Percent, months: u32) -> Option<Money> {
    installment(principal, monthly_rate(annual_percent), months)
}

/// Level installment for a per-month rate:
/// `P * r * (1 + r)^N / ((1 + r)^N - 1)`, or `P / N` at a zero rate. Rounded to 2 dp.
pub fn installment(principal: Money, monthly: Rate, months: u32) -> Option<Money> {
    if !is_positive(principal) || months == 0 {
        return Some(Decimal::ZERO);
    }
    if monthly.is_zero() {
        return Some(round2(safe_divide(principal, Decimal::from(months))));
    }
    let growth = power(Decimal::ONE + monthly, i64::from(months))?;
    let factor = checked_divide(monthly.checked_mul(growth)?, growth - Decimal::ONE)?;
    principal.checked_mul(factor).map(round2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn test_future_value_basic() {
        // 100 at 10% for 5 years = 161.051
        let fv = future_value(dec!(100), dec!(10), dec!(5)).unwrap();
        assert_eq!(fv, dec!(161.051));
    }

    #[test]
    fn test_future_value_truncates_years() {
        assert_eq!(
            future_value(dec!(100), dec!(10), dec!(2.9)),
            future_value(dec!(100), dec!(10), dec!(2))
        );
    }

    #[test]
    fn test_future_value_non_positive_amount_is_zero() {
        assert_eq!(future_value(Decimal::ZERO, dec!(10), dec!(5)), Some(Decimal::ZERO));
        assert_eq!(future_value(dec!(-5), dec!(10), dec!(5)), Some(Decimal::ZERO));
        assert_eq!(future_value(dec!(100), dec!(10), dec!(-1)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_present_value_basic() {
        // 100,000 / 1.10^5 = 62,092.13
        let pv = present_value(dec!(100_000), dec!(10), dec!(5)).unwrap();
        assert_close(pv, dec!(62092.13), dec!(0.01));
    }

    #[test]
    fn test_inflate_expense() {
        // 50,000 at 6% for 30 years ~ 287,175
        let inflated = inflate(dec!(50_000), dec!(6), 30).unwrap();
        assert_close(inflated, dec!(287_174.56), dec!(1));
    }

    #[test]
    fn test_annuity_future_value_sip() {
        // 10,000/month at 12% for 60 months ~ 816,697
        let fva = annuity_future_value(dec!(10_000), dec!(12), 60).unwrap();
        assert_close(fva, dec!(816_696.70), dec!(1));
    }

    #[test]
    fn test_annuity_zero_rate_is_simple_sum() {
        assert_eq!(annuity_future_value(dec!(500), Decimal::ZERO, 24), Some(dec!(12_000)));
        assert_eq!(annuity_present_value(dec!(500), Decimal::ZERO, 24), Some(dec!(12_000)));
    }

    #[test]
    fn test_annuity_present_value() {
        // 1,000/month for 12 months at 12% = 11,255.08
        let pva = annuity_present_value(dec!(1_000), dec!(12), 12).unwrap();
        assert_close(pva, dec!(11_255.08), dec!(0.01));
    }

    #[test]
    fn test_payment_for_future_value_inverts_annuity() {
        let target = annuity_future_value(dec!(7_500), dec!(9), 120).unwrap();
        let payment = payment_for_future_value(target, dec!(9), 120).unwrap();
        assert_close(payment, dec!(7_500), dec!(0.01));
    }

    #[test]
    fn test_emi_textbook() {
        // 5,000,000 at 8.5% over 240 months ~ 43,391
        let e = emi(dec!(5_000_000), dec!(8.5), 240).unwrap();
        assert_close(e, dec!(43_391.16), dec!(1));
    }

    #[test]
    fn test_emi_zero_rate() {
        assert_eq!(emi(dec!(120_000), Decimal::ZERO, 12), Some(dec!(10_000)));
    }

    #[test]
    fn test_emi_degenerate_inputs() {
        assert_eq!(emi(Decimal::ZERO, dec!(10), 12), Some(Decimal::ZERO));
        assert_eq!(emi(dec!(1_000), dec!(10), 0), Some(Decimal::ZERO));
    }

    #[test]
    fn test_growth_beyond_decimal_range_is_none() {
        assert_eq!(emi(dec!(100_000), dec!(12), 7_000), None);
        assert_eq!(emi(dec!(100_000), dec!(300), 360), None);
        assert_eq!(future_value(Decimal::MAX, dec!(10), dec!(1)), None);
        assert_eq!(annuity_future_value(dec!(1_000), dec!(300), 360), None);
        assert_eq!(payment_for_future_value(dec!(1_000), dec!(300), 360), None);
    }

    #[test]
    fn test_annuity_present_value_saturates_long_horizons() {
        // (1 + r)^-N underflows to zero, leaving PMT / r
        let pva = annuity_present_value(dec!(1_000), dec!(12), 7_000).unwrap();
        assert_eq!(pva, dec!(100_000));
    }
}
