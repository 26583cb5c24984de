use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinPlanError;
use crate::precision::{checked_divide, round2, round_to, safe_divide};
use crate::types::{with_metadata, CashFlowPoint, ComputationOutput, Money, Percent, Rate};
use crate::FinPlanResult;

/// Default Newton-Raphson starting rate (10%).
pub const XIRR_GUESS: Rate = dec!(0.10);
pub const XIRR_MAX_ITERATIONS: u32 = 1000;
/// Applied both to the rate step and to the derivative magnitude.
pub const XIRR_TOLERANCE: Decimal = dec!(0.000001);

const DAYS_PER_YEAR: Decimal = dec!(365);
const RETURN_DP: u32 = 4;

// ---------------------------------------------------------------------------
// XIRR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XirrInput {
    pub flows: Vec<CashFlowPoint>,
    #[serde(default)]
    pub guess: Option<Rate>,
    #[serde(default)]
    pub max_iterations: Option<u32>,
    #[serde(default)]
    pub tolerance: Option<Decimal>,
}

/// Why the Newton-Raphson loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XirrTermination {
    /// The rate step fell below the tolerance.
    Converged,
    /// The NPV derivative vanished (or the rate left the domain `r > -100%`);
    /// the last rate is reported.
    DerivativeStall,
    /// The iteration cap was hit; the last rate is reported.
    IterationLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XirrSolution {
    /// Annualised rate in percent, 4 dp.
    pub rate_percent: Percent,
    pub iterations: u32,
    pub termination: XirrTermination,
}

/// Solver knobs; `Default` gives the standard 10% / 1000 / 1e-6 settings.
#[derive(Debug, Clone, Copy)]
pub struct XirrParams {
    pub guess: Rate,
    pub max_iterations: u32,
    pub tolerance: Decimal,
}

impl Default for XirrParams {
    fn default() -> Self {
        XirrParams {
            guess: XIRR_GUESS,
            max_iterations: XIRR_MAX_ITERATIONS,
            tolerance: XIRR_TOLERANCE,
        }
    }
}

impl XirrInput {
    fn params(&self) -> XirrParams {
        let defaults = XirrParams::default();
        XirrParams {
            guess: self.guess.unwrap_or(defaults.guess),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            tolerance: self.tolerance.unwrap_or(defaults.tolerance),
        }
    }
}

/// XIRR of irregular dated cash flows, in percent.
pub fn xirr(flows: &[CashFlowPoint]) -> FinPlanResult<Percent> {
    solve_xirr(flows, XirrParams::default()).map(|s| s.rate_percent)
}

/// XIRR from parallel date and amount series.
pub fn xirr_from_series(dates: &[NaiveDate], amounts: &[Money]) -> FinPlanResult<Percent> {
    if dates.len() != amounts.len() {
        return Err(FinPlanError::InvalidInput {
            field: "amounts".into(),
            reason: format!(
                "{} dates but {} amounts; the series must have the same length",
                dates.len(),
                amounts.len()
            ),
        });
    }
    let flows: Vec<CashFlowPoint> = dates
        .iter()
        .zip(amounts)
        .map(|(date, amount)| CashFlowPoint {
            date: *date,
            amount: *amount,
        })
        .collect();
    xirr(&flows)
}

/// Newton-Raphson on `NPV(r) = sum(a_i / (1 + r)^t_i)` with `t_i` the days
/// since the earliest flow over 365.
pub fn solve_xirr(flows: &[CashFlowPoint], params: XirrParams) -> FinPlanResult<XirrSolution> {
    if flows.len() < 2 {
        return Err(FinPlanError::InsufficientData(
            "XIRR requires at least 2 cash flows".into(),
        ));
    }
    let has_outflow = flows.iter().any(|f| f.amount < Decimal::ZERO);
    let has_inflow = flows.iter().any(|f| f.amount > Decimal::ZERO);
    if !has_outflow || !has_inflow {
        return Err(FinPlanError::InvalidInput {
            field: "flows".into(),
            reason: "XIRR needs at least one negative and one positive cash flow".into(),
        });
    }
    if params.guess <= -Decimal::ONE {
        return Err(FinPlanError::InvalidInput {
            field: "guess".into(),
            reason: "must be greater than -1 (a -100% rate)".into(),
        });
    }

    let base = flows.iter().map(|f| f.date).min().unwrap_or(flows[0].date);
    let timed: Vec<(Decimal, Money)> = flows
        .iter()
        .map(|f| {
            let days = (f.date - base).num_days();
            (safe_divide(Decimal::from(days), DAYS_PER_YEAR), f.amount)
        })
        .collect();

    let mut rate = params.guess;
    for iteration in 1..=params.max_iterations {
        let Some((npv, derivative)) = npv_and_derivative(&timed, rate) else {
            return Ok(stalled(rate, iteration));
        };
        if derivative.abs() < params.tolerance {
            return Ok(stalled(rate, iteration));
        }
        let Some(next) = newton_step(rate, npv, derivative) else {
            return Ok(stalled(rate, iteration));
        };
        if next <= -Decimal::ONE {
            return Ok(stalled(rate, iteration));
        }
        if (next - rate).abs() < params.tolerance {
            tracing::debug!(iterations = iteration, rate = %next, "XIRR converged");
            return Ok(XirrSolution {
                rate_percent: to_percent(next),
                iterations: iteration,
                termination: XirrTermination::Converged,
            });
        }
        rate = next;
    }

    tracing::warn!(
        iterations = params.max_iterations,
        rate = %rate,
        "XIRR hit the iteration limit"
    );
    Ok(XirrSolution {
        rate_percent: to_percent(rate),
        iterations: params.max_iterations,
        termination: XirrTermination::IterationLimit,
    })
}

/// Envelope wrapper around [`solve_xirr`] honouring the input's overrides.
pub fn compute_xirr(input: &XirrInput) -> FinPlanResult<ComputationOutput<XirrSolution>> {
    let start = Instant::now();
    let params = input.params();
    let solution = solve_xirr(&input.flows, params)?;

    let mut warnings = Vec::new();
    match solution.termination {
        XirrTermination::Converged => {}
        XirrTermination::DerivativeStall => warnings.push(format!(
            "XIRR stalled after {} iterations; reporting the last rate",
            solution.iterations
        )),
        XirrTermination::IterationLimit => warnings.push(format!(
            "XIRR did not converge within {} iterations; reporting the last rate",
            solution.iterations
        )),
    }

    let assumptions = serde_json::json!({
        "flows": input.flows.len(),
        "guess": params.guess.to_string(),
        "max_iterations": params.max_iterations,
        "tolerance": params.tolerance.to_string(),
        "day_count": "actual/365",
    });
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "XIRR (Newton-Raphson, actual/365)",
        &assumptions,
        warnings,
        elapsed,
        solution,
    ))
}

fn npv_and_derivative(timed: &[(Decimal, Money)], rate: Rate) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }
    let mut npv = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;
    for (years, amount) in timed {
        let discount = one_plus_r.checked_powd(*years)?;
        if discount.is_zero() {
            return None;
        }
        npv = npv.checked_add(amount.checked_div(discount)?)?;
        let weighted = amount.checked_mul(*years)?;
        derivative = derivative.checked_sub(weighted.checked_div(discount.checked_mul(one_plus_r)?)?)?;
    }
    Some((npv, derivative))
}

/// `rate - npv / derivative`; `None` when the step or the next rate in
/// percent leaves the `Decimal` range.
fn newton_step(rate: Rate, npv: Decimal, derivative: Decimal) -> Option<Rate> {
    let next = rate.checked_sub(npv.checked_div(derivative)?)?;
    next.checked_mul(dec!(100))?;
    next.checked_sub(rate)?;
    Some(next)
}

fn stalled(rate: Rate, iteration: u32) -> XirrSolution {
    tracing::warn!(iterations = iteration, rate = %rate, "XIRR derivative stalled");
    XirrSolution {
        rate_percent: to_percent(rate),
        iterations: iteration,
        termination: XirrTermination::DerivativeStall,
    }
}

fn to_percent(rate: Rate) -> Percent {
    round_to(rate.saturating_mul(dec!(100)), RETURN_DP)
}

// ---------------------------------------------------------------------------
// CAGR and absolute return
// ---------------------------------------------------------------------------

/// `((ending / beginning)^(1 / years) - 1) * 100`, 4 dp. Zero when the
/// beginning value or the period is not positive.
pub fn cagr(beginning: Money, ending: Money, years: Decimal) -> Percent {
    if beginning <= Decimal::ZERO || years <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let ratio = saturating_ratio(ending, beginning);
    if ratio <= Decimal::ZERO {
        return round_to(dec!(-100), RETURN_DP);
    }
    let growth = match ratio.checked_powd(safe_divide(Decimal::ONE, years)) {
        Some(growth) => growth,
        None if ratio > Decimal::ONE => Decimal::MAX,
        None => Decimal::ZERO,
    };
    round_to((growth - Decimal::ONE).saturating_mul(dec!(100)), RETURN_DP)
}

/// `(current - invested) * 100 / invested`, 4 dp. Zero when nothing was invested.
pub fn absolute_return(invested: Money, current: Money) -> Percent {
    if invested.is_zero() {
        return Decimal::ZERO;
    }
    let gain = current.saturating_sub(invested);
    let scaled = match gain.checked_mul(dec!(100)) {
        Some(scaled) => saturating_ratio(scaled, invested),
        None => saturating_ratio(gain, invested).saturating_mul(dec!(100)),
    };
    round_to(scaled, RETURN_DP)
}

/// `numerator / denominator`, pinned to `Decimal::MAX` or `Decimal::MIN`
/// when the quotient leaves the range.
fn saturating_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    checked_divide(numerator, denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthInput {
    pub beginning_value: Money,
    pub ending_value: Money,
    pub years: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrowthOutput {
    pub cagr_percent: Percent,
    pub absolute_return_percent: Percent,
    pub gain: Money,
}

pub fn compute_growth(input: &GrowthInput) -> ComputationOutput<GrowthOutput> {
    let start = Instant::now();
    let mut warnings = Vec::new();
    if input.beginning_value <= Decimal::ZERO {
        warnings.push("beginning_value must be positive; CAGR reported as 0".into());
    }
    if input.years <= Decimal::ZERO {
        warnings.push("years must be positive; CAGR reported as 0".into());
    }
    let output = GrowthOutput {
        cagr_percent: cagr(input.beginning_value, input.ending_value, input.years),
        absolute_return_percent: absolute_return(input.beginning_value, input.ending_value),
        gain: round2(input.ending_value.saturating_sub(input.beginning_value)),
    };
    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata("CAGR and absolute return", input, warnings, elapsed, output)
}

// ---------------------------------------------------------------------------
// Portfolio performance summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Buy,
    Sell,
}

/// A buy or sell at its net amount (always positive; the kind gives the sign).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioTransaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceInput {
    pub transactions: Vec<PortfolioTransaction>,
    pub current_value: Money,
    pub valuation_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceOutput {
    pub total_invested: Money,
    pub total_redeemed: Money,
    pub current_value: Money,
    pub xirr_percent: Option<Percent>,
    pub xirr_termination: Option<XirrTermination>,
    pub cagr_percent: Percent,
    pub absolute_return_percent: Percent,
    pub first_investment_date: Option<NaiveDate>,
    pub holding_days: i64,
}

/// XIRR, CAGR and absolute return of a transaction history valued today.
///
/// Buys are outflows, sells inflows, and a positive current value is a final
/// inflow on the valuation date. CAGR runs from the total invested to the
/// current value over the time since the first buy.
pub fn summarize_performance(
    input: &PerformanceInput,
) -> FinPlanResult<ComputationOutput<PerformanceOutput>> {
    let start = Instant::now();
    if input.transactions.is_empty() {
        return Err(FinPlanError::InsufficientData(
            "performance summary requires at least one transaction".into(),
        ));
    }
    if let Some(bad) = input.transactions.iter().find(|t| t.amount < Decimal::ZERO) {
        return Err(FinPlanError::InvalidInput {
            field: "transactions.amount".into(),
            reason: format!("transaction on {} has a negative amount", bad.date),
        });
    }
    if let Some(late) = input
        .transactions
        .iter()
        .find(|t| t.date > input.valuation_date)
    {
        return Err(FinPlanError::DateError(format!(
            "transaction on {} is after the valuation date {}",
            late.date, input.valuation_date
        )));
    }

    let mut warnings = Vec::new();
    let mut flows = Vec::with_capacity(input.transactions.len() + 1);
    let mut invested = Decimal::ZERO;
    let mut redeemed = Decimal::ZERO;
    for t in &input.transactions {
        let amount = match t.kind {
            TransactionKind::Buy => {
                invested = invested
                    .checked_add(t.amount)
                    .ok_or_else(|| FinPlanError::out_of_range("transactions.amount"))?;
                -t.amount
            }
            TransactionKind::Sell => {
                redeemed = redeemed
                    .checked_add(t.amount)
                    .ok_or_else(|| FinPlanError::out_of_range("transactions.amount"))?;
                t.amount
            }
        };
        flows.push(CashFlowPoint {
            date: t.date,
            amount,
        });
    }
    if input.current_value > Decimal::ZERO {
        flows.push(CashFlowPoint {
            date: input.valuation_date,
            amount: input.current_value,
        });
    }

    let (xirr_percent, xirr_termination) = match solve_xirr(&flows, XirrParams::default()) {
        Ok(solution) => {
            if solution.termination != XirrTermination::Converged {
                warnings.push(format!("XIRR did not converge ({:?})", solution.termination));
            }
            (Some(solution.rate_percent), Some(solution.termination))
        }
        Err(e) => {
            warnings.push(format!("XIRR unavailable: {e}"));
            (None, None)
        }
    };

    let first_buy = input
        .transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Buy)
        .map(|t| t.date)
        .min();
    let holding_days = first_buy
        .map(|d| (input.valuation_date - d).num_days())
        .unwrap_or(0);
    let years = safe_divide(Decimal::from(holding_days), DAYS_PER_YEAR);

    let output = PerformanceOutput {
        total_invested: round2(invested),
        total_redeemed: round2(redeemed),
        current_value: round2(input.current_value),
        xirr_percent,
        xirr_termination,
        cagr_percent: cagr(invested, input.current_value, years),
        absolute_return_percent: absolute_return(invested, input.current_value),
        first_investment_date: first_buy,
        holding_days,
    };

    let assumptions = serde_json::json!({
        "transactions": input.transactions.len(),
        "valuation_date": input.valuation_date.to_string(),
        "day_count": "actual/365",
    });
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio performance (XIRR, CAGR, absolute return)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn flow(date: NaiveDate, amount: Decimal) -> CashFlowPoint {
        CashFlowPoint { date, amount }
    }

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn test_xirr_one_year_twenty_percent() {
        let flows = vec![
            flow(d(2023, 1, 1), dec!(-100_000)),
            flow(d(2024, 1, 1), dec!(120_000)),
        ];
        // 2023 is not a leap year, so the horizon is exactly 365 days.
        let solution = solve_xirr(&flows, XirrParams::default()).unwrap();
        assert_eq!(solution.termination, XirrTermination::Converged);
        assert_close(solution.rate_percent, dec!(20), dec!(0.01));
    }

    #[test]
    fn test_xirr_monthly_investments() {
        let mut flows: Vec<CashFlowPoint> = (1..=12)
            .map(|m| flow(d(2023, m, 1), dec!(-10_000)))
            .collect();
        flows.push(flow(d(2024, 1, 1), dec!(130_000)));
        let rate = xirr(&flows).unwrap();
        assert!(rate > dec!(10) && rate < dec!(25), "got {rate}");
    }

    #[test]
    fn test_xirr_negative_return() {
        let flows = vec![
            flow(d(2022, 1, 1), dec!(-100_000)),
            flow(d(2023, 1, 1), dec!(90_000)),
        ];
        assert_close(xirr(&flows).unwrap(), dec!(-10), dec!(0.01));
    }

    #[test]
    fn test_xirr_uses_earliest_date_as_base() {
        let ordered = vec![
            flow(d(2023, 1, 1), dec!(-100_000)),
            flow(d(2024, 1, 1), dec!(120_000)),
        ];
        let shuffled = vec![ordered[1].clone(), ordered[0].clone()];
        assert_eq!(xirr(&ordered).unwrap(), xirr(&shuffled).unwrap());
    }

    #[test]
    fn test_xirr_requires_two_flows() {
        let flows = vec![flow(d(2023, 1, 1), dec!(-100))];
        assert!(matches!(xirr(&flows), Err(FinPlanError::InsufficientData(_))));
    }

    #[test]
    fn test_xirr_requires_mixed_signs() {
        let flows = vec![flow(d(2023, 1, 1), dec!(100)), flow(d(2024, 1, 1), dec!(100))];
        assert!(matches!(xirr(&flows), Err(FinPlanError::InvalidInput { .. })));
    }

    #[test]
    fn test_xirr_series_length_mismatch() {
        let result = xirr_from_series(&[d(2023, 1, 1), d(2024, 1, 1)], &[dec!(-100)]);
        assert!(matches!(result, Err(FinPlanError::InvalidInput { .. })));
    }

    #[test]
    fn test_xirr_iteration_limit_reported() {
        let flows = vec![
            flow(d(2023, 1, 1), dec!(-100_000)),
            flow(d(2024, 1, 1), dec!(120_000)),
        ];
        let params = XirrParams {
            max_iterations: 1,
            ..XirrParams::default()
        };
        let solution = solve_xirr(&flows, params).unwrap();
        assert_eq!(solution.termination, XirrTermination::IterationLimit);
        assert_eq!(solution.iterations, 1);
    }

    #[test]
    fn test_compute_xirr_envelope() {
        let input = XirrInput {
            flows: vec![
                flow(d(2023, 1, 1), dec!(-100_000)),
                flow(d(2024, 1, 1), dec!(120_000)),
            ],
            guess: Some(dec!(0.05)),
            max_iterations: None,
            tolerance: None,
        };
        let out = compute_xirr(&input).unwrap();
        assert!(out.warnings.is_empty());
        assert_close(out.result.rate_percent, dec!(20), dec!(0.01));
    }

    #[test]
    fn test_cagr_doubling() {
        // 100 -> 200 over 5 years is about 14.87% a year
        assert_close(cagr(dec!(100), dec!(200), dec!(5)), dec!(14.8698), dec!(0.001));
    }

    #[test]
    fn test_cagr_degenerate() {
        assert_eq!(cagr(Decimal::ZERO, dec!(200), dec!(5)), Decimal::ZERO);
        assert_eq!(cagr(dec!(100), dec!(200), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(cagr(dec!(100), Decimal::ZERO, dec!(2)), dec!(-100));
    }

    #[test]
    fn test_absolute_return() {
        assert_eq!(absolute_return(dec!(100_000), dec!(125_000)), dec!(25));
        assert_eq!(absolute_return(dec!(100_000), dec!(80_000)), dec!(-20));
        assert_eq!(absolute_return(Decimal::ZERO, dec!(80_000)), Decimal::ZERO);
    }

    #[test]
    fn test_performance_summary() {
        let input = PerformanceInput {
            transactions: vec![
                PortfolioTransaction {
                    date: d(2022, 1, 1),
                    kind: TransactionKind::Buy,
                    amount: dec!(50_000),
                },
                PortfolioTransaction {
                    date: d(2022, 7, 1),
                    kind: TransactionKind::Buy,
                    amount: dec!(50_000),
                },
                PortfolioTransaction {
                    date: d(2023, 1, 1),
                    kind: TransactionKind::Sell,
                    amount: dec!(10_000),
                },
            ],
            current_value: dec!(120_000),
            valuation_date: d(2024, 1, 1),
        };
        let out = summarize_performance(&input).unwrap().result;
        assert_eq!(out.total_invested, dec!(100_000));
        assert_eq!(out.total_redeemed, dec!(10_000));
        assert_eq!(out.absolute_return_percent, dec!(20));
        assert_eq!(out.holding_days, 730);
        assert_eq!(out.first_investment_date, Some(d(2022, 1, 1)));
        assert!(out.xirr_percent.unwrap() > Decimal::ZERO);
        assert!(out.cagr_percent > dec!(9) && out.cagr_percent < dec!(10));
    }

    #[test]
    fn test_performance_without_value_has_no_xirr() {
        let input = PerformanceInput {
            transactions: vec![PortfolioTransaction {
                date: d(2022, 1, 1),
                kind: TransactionKind::Buy,
                amount: dec!(50_000),
            }],
            current_value: Decimal::ZERO,
            valuation_date: d(2024, 1, 1),
        };
        let out = summarize_performance(&input).unwrap();
        assert!(out.result.xirr_percent.is_none());
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_performance_rejects_future_transactions() {
        let input = PerformanceInput {
            transactions: vec![PortfolioTransaction {
                date: d(2025, 1, 1),
                kind: TransactionKind::Buy,
                amount: dec!(50_000),
            }],
            current_value: dec!(1),
            valuation_date: d(2024, 1, 1),
        };
        assert!(matches!(
            summarize_performance(&input),
            Err(FinPlanError::DateError(_))
        ));
    }

    #[test]
    fn test_xirr_beyond_decimal_range_stalls_at_last_finite_rate() {
        let flows = vec![
            flow(d(2023, 1, 1), dec!(-100)),
            flow(d(2023, 1, 2), dec!(1_000_000_000_000_000_000_000_000)),
        ];
        let solution = solve_xirr(&flows, XirrParams::default()).unwrap();
        assert_eq!(solution.termination, XirrTermination::DerivativeStall);
        assert!(solution.rate_percent > Decimal::ZERO);
        assert!(xirr(&flows).is_ok());
    }

    #[test]
    fn test_xirr_rejects_guess_at_minus_one_hundred_percent() {
        let flows = vec![
            flow(d(2023, 1, 1), dec!(-100_000)),
            flow(d(2024, 1, 1), dec!(120_000)),
        ];
        let params = XirrParams {
            guess: dec!(-1),
            ..XirrParams::default()
        };
        assert!(matches!(
            solve_xirr(&flows, params),
            Err(FinPlanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_growth_figures_saturate_instead_of_overflowing() {
        assert_eq!(cagr(dec!(0.0001), Decimal::MAX, dec!(0.0001)), Decimal::MAX);
        assert_eq!(absolute_return(dec!(0.0001), Decimal::MAX), Decimal::MAX);
        assert_eq!(absolute_return(dec!(0.0001), Decimal::MIN), Decimal::MIN);
        let out = compute_growth(&GrowthInput {
            beginning_value: dec!(-1),
            ending_value: Decimal::MAX,
            years: dec!(1),
        });
        assert_eq!(out.result.gain, Decimal::MAX);
    }
}
