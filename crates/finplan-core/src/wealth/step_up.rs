//! Growing periodic contributions (a monthly deposit that steps up every year).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::guard::{out_of_range, Guard, MAX_HORIZON_YEARS};
use crate::precision::{percent_to_fraction, round2};
use crate::time_value::{annuity_future_value, future_value};
use crate::types::{with_metadata, ChartPoint, ComputationOutput, Money, Percent};

const METHODOLOGY: &str = "Step-up Contribution Projection (annual step-up, monthly compounding)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepUpInput {
    /// Monthly contribution during the first year.
    pub monthly_contribution: Money,
    pub annual_return_percent: Percent,
    pub years: u32,
    /// Yearly increase of the monthly contribution (10 = +10% per year).
    #[serde(default)]
    pub annual_step_up_percent: Percent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepUpYearRecord {
    pub year: u32,
    pub monthly_contribution: Money,
    pub yearly_contribution: Money,
    /// That year's 12 deposits, accumulated to the end of the year.
    pub value_at_year_end: Money,
    /// `value_at_year_end` grown to the end of the horizon.
    pub value_at_horizon: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepUpOutput {
    pub total_invested: Money,
    pub maturity_value: Money,
    pub wealth_gained: Money,
    pub first_year_monthly_contribution: Money,
    pub last_year_monthly_contribution: Money,
    pub yearly_breakdown: Vec<StepUpYearRecord>,
    /// Corpus at the end of each year.
    pub maturity_curve: Vec<ChartPoint>,
}

/// Project a stepped-up contribution plan year by year.
///
/// Year `y` deposits `C * (1 + S)^(y-1)` per month. Its 12 deposits are
/// valued at year end as a monthly annuity, then grown to the horizon at the
/// annual return over the remaining `Y - y` years.
pub fn project_step_up(input: &StepUpInput) -> ComputationOutput<StepUpOutput> {
    let start = Instant::now();
    let assumptions = serde_json::json!({
        "monthly_contribution": input.monthly_contribution.to_string(),
        "annual_return_percent": input.annual_return_percent.to_string(),
        "years": input.years,
        "annual_step_up_percent": input.annual_step_up_percent.to_string(),
    });

    let guard = Guard::new()
        .positive(input.monthly_contribution, "monthly_contribution")
        .require(input.years > 0, "years", "must be at least 1")
        .at_most(input.years, MAX_HORIZON_YEARS, "years");
    if let Some(empty) = guard.reject(METHODOLOGY, &assumptions, start) {
        return empty;
    }

    match project(input) {
        Some(output) => {
            tracing::debug!(
                years = input.years,
                invested = %output.total_invested,
                maturity = %output.maturity_value,
                "step-up projection complete"
            );
            let elapsed = start.elapsed().as_micros() as u64;
            with_metadata(METHODOLOGY, &assumptions, Vec::new(), elapsed, output)
        }
        None => out_of_range("maturity_value", METHODOLOGY, &assumptions, start),
    }
}

fn project(input: &StepUpInput) -> Option<StepUpOutput> {
    let step_factor = Decimal::ONE + percent_to_fraction(input.annual_step_up_percent);
    let growth_factor = Decimal::ONE + percent_to_fraction(input.annual_return_percent);

    let mut yearly_breakdown = Vec::with_capacity(input.years as usize);
    let mut maturity_curve = Vec::with_capacity(input.years as usize);
    let mut contribution = input.monthly_contribution;
    let mut total_invested = Decimal::ZERO;
    let mut maturity_value = Decimal::ZERO;
    let mut corpus = Decimal::ZERO;

    for year in 1..=input.years {
        let yearly = contribution.checked_mul(Decimal::from(12))?;
        let at_year_end = annuity_future_value(contribution, input.annual_return_percent, 12)?;
        let remaining = Decimal::from(input.years - year);
        let at_horizon = if remaining.is_zero() {
            at_year_end
        } else {
            future_value(at_year_end, input.annual_return_percent, remaining)?
        };

        total_invested = total_invested.checked_add(yearly)?;
        maturity_value = maturity_value.checked_add(at_horizon)?;
        corpus = corpus.checked_mul(growth_factor)?.checked_add(at_year_end)?;

        yearly_breakdown.push(StepUpYearRecord {
            year,
            monthly_contribution: round2(contribution),
            yearly_contribution: round2(yearly),
            value_at_year_end: round2(at_year_end),
            value_at_horizon: round2(at_horizon),
        });
        maturity_curve.push(ChartPoint::new(format!("Year {year}"), round2(corpus)));

        contribution = contribution.checked_mul(step_factor)?;
    }

    let first = yearly_breakdown
        .first()
        .map(|r| r.monthly_contribution)
        .unwrap_or(Decimal::ZERO);
    let last = yearly_breakdown
        .last()
        .map(|r| r.monthly_contribution)
        .unwrap_or(Decimal::ZERO);

    Some(StepUpOutput {
        total_invested: round2(total_invested),
        maturity_value: round2(maturity_value),
        wealth_gained: round2(maturity_value - total_invested),
        first_year_monthly_contribution: first,
        last_year_monthly_contribution: last,
        yearly_breakdown,
        maturity_curve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(years: u32, step_up: Decimal) -> StepUpInput {
        StepUpInput {
            monthly_contribution: dec!(10_000),
            annual_return_percent: dec!(12),
            years,
            annual_step_up_percent: step_up,
        }
    }

    #[test]
    fn test_three_year_step_up() {
        let out = project_step_up(&input(3, dec!(10))).result;
        assert_eq!(out.total_invested, dec!(397_200));
        assert_eq!(out.first_year_monthly_contribution.to_string(), "10000.00");
        assert_eq!(out.last_year_monthly_contribution.to_string(), "12100.00");
        assert_eq!(out.yearly_breakdown.len(), 3);
        assert!(out.maturity_value > out.total_invested);
        assert!(out.wealth_gained > Decimal::ZERO);
    }

    #[test]
    fn test_contribution_grows_by_step_factor() {
        let out = project_step_up(&input(5, dec!(8))).result;
        for pair in out.yearly_breakdown.windows(2) {
            let expected = round2(pair[0].monthly_contribution * dec!(1.08));
            assert!((pair[1].monthly_contribution - expected).abs() <= dec!(0.01));
        }
    }

    #[test]
    fn test_zero_step_up_matches_plain_plan() {
        let out = project_step_up(&input(5, Decimal::ZERO)).result;
        assert_eq!(out.total_invested, dec!(600_000));
        assert!(out.maturity_value > dec!(600_000));
    }

    #[test]
    fn test_last_year_not_grown_further() {
        let out = project_step_up(&input(4, dec!(5))).result;
        let last = out.yearly_breakdown.last().unwrap();
        assert_eq!(last.value_at_horizon, last.value_at_year_end);
    }

    #[test]
    fn test_maturity_curve_ends_at_maturity_value() {
        let out = project_step_up(&input(10, dec!(10))).result;
        assert_eq!(out.maturity_curve.len(), 10);
        let end = out.maturity_curve.last().unwrap().value;
        assert!((end - out.maturity_value).abs() <= dec!(0.01));
    }

    #[test]
    fn test_invalid_years_returns_zero() {
        let out = project_step_up(&input(0, dec!(10)));
        assert_eq!(out.result.total_invested, Decimal::ZERO);
        assert_eq!(out.result.maturity_value, Decimal::ZERO);
        assert_eq!(out.result.wealth_gained, Decimal::ZERO);
        assert!(out.result.yearly_breakdown.is_empty());
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_invalid_contribution_returns_zero() {
        let mut i = input(5, dec!(10));
        i.monthly_contribution = dec!(-1);
        assert!(project_step_up(&i).result.yearly_breakdown.is_empty());
    }

    #[test]
    fn test_runaway_step_up_is_rejected_without_panicking() {
        let mut i = input(100, dec!(300));
        i.annual_return_percent = dec!(300);
        let out = project_step_up(&i);
        assert!(out.result.yearly_breakdown.is_empty());
        assert_eq!(out.result.maturity_value, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("decimal range")));
    }

    #[test]
    fn test_years_beyond_horizon_rejected() {
        let out = project_step_up(&input(MAX_HORIZON_YEARS + 1, dec!(10)));
        assert!(out.result.yearly_breakdown.is_empty());
        assert!(out.warnings.iter().any(|w| w.contains("years")));
    }
}
