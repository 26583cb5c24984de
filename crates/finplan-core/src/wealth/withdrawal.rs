//! Systematic withdrawal plan (SWP) simulation.
//!
//! A corpus earns a monthly return and pays out a monthly withdrawal that can
//! be indexed to inflation. The simulation stops early once the corpus is
//! exhausted and classifies how sustainable the plan is.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::guard::{Guard, MAX_HORIZON_YEARS};
use crate::precision::{
    monthly_rate, percent_of, round2, round_to, safe_divide, INTERNAL_SCALE, ROUNDING_EPSILON,
};
use crate::types::{annual_samples, with_metadata, ChartPoint, ComputationOutput, Money, Percent};

const METHODOLOGY: &str = "Systematic Withdrawal Simulation (monthly return, optional inflation indexing)";

const SAFE_RATE_FLOOR: Percent = dec!(3);
const SAFE_RATE_CEILING: Percent = dec!(6);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalInput {
    pub starting_corpus: Money,
    pub monthly_withdrawal: Money,
    pub annual_return_percent: Percent,
    pub duration_years: u32,
    #[serde(default)]
    pub inflation_percent: Option<Percent>,
    /// Grow the withdrawal every month by the monthly inflation rate.
    #[serde(default)]
    pub inflation_adjusted: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalMonth {
    pub month: u32,
    pub year: u32,
    pub opening_balance: Money,
    pub investment_return: Money,
    pub withdrawal: Money,
    pub closing_balance: Money,
    pub net_change: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalYear {
    pub year: u32,
    pub starting_corpus: Money,
    pub total_returns: Money,
    pub total_withdrawals: Money,
    pub ending_corpus: Money,
    pub average_monthly_withdrawal: Money,
    pub corpus_growing: bool,
}

/// Outcome classes, checked in declaration order. A plan that lasts the full
/// duration but shrinks is judged on its withdrawal rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SustainabilityVerdict {
    /// The corpus ran out before the requested duration.
    Exhausted,
    /// The corpus ends above where it started.
    GrowingCorpus,
    WithinSafeLimits,
    ExceedsSafeLimits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WithdrawalOutput {
    pub starting_corpus: Money,
    pub initial_monthly_withdrawal: Money,
    pub final_corpus: Money,
    pub total_withdrawn: Money,
    pub total_returns: Money,
    pub requested_duration_months: u32,
    pub effective_duration_months: u32,
    pub is_sustainable: bool,
    pub verdict: Option<SustainabilityVerdict>,
    pub message: String,
    /// Initial annual withdrawal as a percentage of the starting corpus.
    pub withdrawal_rate: Percent,
    pub safe_withdrawal_rate: Percent,
    pub monthly_breakdown: Vec<WithdrawalMonth>,
    pub yearly_summary: Vec<WithdrawalYear>,
    pub corpus_chart: Vec<ChartPoint>,
    pub withdrawal_chart: Vec<ChartPoint>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn simulate_withdrawals(input: &WithdrawalInput) -> ComputationOutput<WithdrawalOutput> {
    let start = Instant::now();
    let inflation = input.inflation_percent.unwrap_or(Decimal::ZERO);
    let indexed = input.inflation_adjusted.unwrap_or(false);
    let assumptions = serde_json::json!({
        "starting_corpus": input.starting_corpus.to_string(),
        "monthly_withdrawal": input.monthly_withdrawal.to_string(),
        "annual_return_percent": input.annual_return_percent.to_string(),
        "duration_years": input.duration_years,
        "inflation_percent": inflation.to_string(),
        "inflation_adjusted": indexed,
    });

    let guard = Guard::new()
        .positive(input.starting_corpus, "starting_corpus")
        .non_negative(input.monthly_withdrawal, "monthly_withdrawal")
        .require(input.duration_years > 0, "duration_years", "must be at least 1")
        .at_most(input.duration_years, MAX_HORIZON_YEARS, "duration_years");
    if let Some(empty) = guard.reject(METHODOLOGY, &assumptions, start) {
        return empty;
    }

    let mut warnings = Vec::new();
    if indexed && input.inflation_percent.is_none() {
        warnings.push("inflation_adjusted is set without inflation_percent; withdrawals stay level".into());
    }

    let inflation_factor = if indexed {
        Decimal::ONE + monthly_rate(inflation)
    } else {
        Decimal::ONE
    };
    let requested = input.duration_years * 12;
    let Simulation {
        rows: monthly_breakdown,
        totals,
        out_of_range_at,
    } = run_months(
        input.starting_corpus,
        input.monthly_withdrawal,
        monthly_rate(input.annual_return_percent),
        inflation_factor,
        requested,
    );
    let effective = monthly_breakdown.len() as u32;
    if let Some(month) = out_of_range_at {
        tracing::warn!(month, requested, "corpus left the decimal range, simulation stopped");
        warnings.push(format!(
            "corpus exceeds the supported decimal range at month {month}; simulation stopped"
        ));
    } else if effective < requested {
        tracing::warn!(month = effective, requested, "corpus exhausted before requested duration");
    }

    let final_corpus = monthly_breakdown
        .last()
        .map(|m| m.closing_balance)
        .unwrap_or(input.starting_corpus);
    let ran_full_course = effective >= requested || out_of_range_at.is_some();
    let is_sustainable = ran_full_course && final_corpus > Decimal::ZERO;

    let withdrawal_rate = percent_of(
        input.monthly_withdrawal.saturating_mul(Decimal::from(12)),
        input.starting_corpus,
    );
    let safe_withdrawal_rate = safe_rate(input.annual_return_percent, inflation);
    let verdict = classify(
        is_sustainable,
        final_corpus,
        input.starting_corpus,
        withdrawal_rate,
        safe_withdrawal_rate,
    );

    let yearly_summary = summarize_years(&monthly_breakdown);
    let corpus_chart = annual_samples(
        &monthly_breakdown,
        |m| format!("Month {}", m.month),
        |m| m.closing_balance,
    );
    let withdrawal_chart = monthly_breakdown
        .iter()
        .step_by(12)
        .map(|m| ChartPoint::new(format!("Year {}", m.year), m.withdrawal))
        .collect();

    let output = WithdrawalOutput {
        starting_corpus: round2(input.starting_corpus),
        initial_monthly_withdrawal: round2(input.monthly_withdrawal),
        final_corpus: round2(final_corpus),
        total_withdrawn: round2(totals.withdrawn),
        total_returns: round2(totals.returns),
        requested_duration_months: requested,
        effective_duration_months: effective,
        is_sustainable,
        verdict: Some(verdict),
        message: verdict_message(verdict, withdrawal_rate, safe_withdrawal_rate),
        withdrawal_rate: round2(withdrawal_rate),
        safe_withdrawal_rate: round2(safe_withdrawal_rate),
        monthly_breakdown,
        yearly_summary,
        corpus_chart,
        withdrawal_chart,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(METHODOLOGY, &assumptions, warnings, elapsed, output)
}

/// `clamp(return - inflation, 3, 6)` in percent.
pub fn safe_rate(annual_return_percent: Percent, inflation_percent: Percent) -> Percent {
    (annual_return_percent - inflation_percent).clamp(SAFE_RATE_FLOOR, SAFE_RATE_CEILING)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Totals {
    withdrawn: Money,
    returns: Money,
}

struct Simulation {
    rows: Vec<WithdrawalMonth>,
    totals: Totals,
    /// Month whose balance left the `Decimal` range; the run stops before it.
    out_of_range_at: Option<u32>,
}

struct MonthStep {
    investment_return: Money,
    withdrawal: Money,
    closing: Money,
    net_change: Money,
}

fn step_month(opening: Money, withdrawal: Money, monthly_return: Decimal) -> Option<MonthStep> {
    let investment_return = opening.checked_mul(monthly_return)?;
    let actual = withdrawal.min(opening);
    let closing = opening
        .checked_add(investment_return)?
        .checked_sub(actual)?
        .max(Decimal::ZERO);
    Some(MonthStep {
        investment_return,
        withdrawal: actual,
        closing,
        net_change: investment_return.checked_sub(actual)?,
    })
}

fn run_months(
    corpus_start: Money,
    first_withdrawal: Money,
    monthly_return: Decimal,
    inflation_factor: Decimal,
    months: u32,
) -> Simulation {
    let mut rows = Vec::with_capacity(months.min(MAX_HORIZON_YEARS * 12) as usize);
    let mut totals = Totals::default();
    let mut corpus = corpus_start;
    let mut withdrawal = first_withdrawal;
    let mut out_of_range_at = None;

    for month in 1..=months {
        if corpus < ROUNDING_EPSILON {
            break;
        }
        let opening = corpus;
        if month > 1 {
            withdrawal = round_to(withdrawal.saturating_mul(inflation_factor), INTERNAL_SCALE);
        }
        let step = step_month(opening, withdrawal, monthly_return).and_then(|step| {
            let withdrawn = totals.withdrawn.checked_add(step.withdrawal)?;
            let returns = totals.returns.checked_add(step.investment_return)?;
            Some((step, withdrawn, returns))
        });
        let Some((step, withdrawn, returns)) = step else {
            out_of_range_at = Some(month);
            break;
        };

        corpus = step.closing;
        totals.withdrawn = withdrawn;
        totals.returns = returns;
        rows.push(WithdrawalMonth {
            month,
            year: (month - 1) / 12 + 1,
            opening_balance: round2(opening),
            investment_return: round2(step.investment_return),
            withdrawal: round2(step.withdrawal),
            closing_balance: round2(corpus),
            net_change: round2(step.net_change),
        });
    }
    Simulation {
        rows,
        totals,
        out_of_range_at,
    }
}

fn summarize_years(months: &[WithdrawalMonth]) -> Vec<WithdrawalYear> {
    months
        .chunks(12)
        .enumerate()
        .filter_map(|(i, chunk)| {
            let first = chunk.first()?;
            let last = chunk.last()?;
            let total_returns = chunk
                .iter()
                .fold(Decimal::ZERO, |acc, m| acc.saturating_add(m.investment_return));
            let total_withdrawals = chunk
                .iter()
                .fold(Decimal::ZERO, |acc, m| acc.saturating_add(m.withdrawal));
            Some(WithdrawalYear {
                year: i as u32 + 1,
                starting_corpus: first.opening_balance,
                total_returns,
                total_withdrawals,
                ending_corpus: last.closing_balance,
                average_monthly_withdrawal: round2(safe_divide(
                    total_withdrawals,
                    Decimal::from(chunk.len() as u32),
                )),
                corpus_growing: last.closing_balance > first.opening_balance,
            })
        })
        .collect()
}

fn classify(
    is_sustainable: bool,
    final_corpus: Money,
    starting_corpus: Money,
    withdrawal_rate: Percent,
    safe_withdrawal_rate: Percent,
) -> SustainabilityVerdict {
    if !is_sustainable || final_corpus < ROUNDING_EPSILON {
        SustainabilityVerdict::Exhausted
    } else if final_corpus > starting_corpus {
        SustainabilityVerdict::GrowingCorpus
    } else if withdrawal_rate <= safe_withdrawal_rate {
        SustainabilityVerdict::WithinSafeLimits
    } else {
        SustainabilityVerdict::ExceedsSafeLimits
    }
}

fn verdict_message(verdict: SustainabilityVerdict, rate: Percent, safe: Percent) -> String {
    let rate = round2(rate);
    let safe = round2(safe);
    match verdict {
        SustainabilityVerdict::Exhausted => {
            "UNSUSTAINABLE: the corpus is fully exhausted within the requested duration".into()
        }
        SustainabilityVerdict::GrowingCorpus => {
            "HIGHLY SUSTAINABLE: the corpus keeps growing despite the withdrawals".into()
        }
        SustainabilityVerdict::WithinSafeLimits => format!(
            "SUSTAINABLE: withdrawal rate {rate}% is within the safe limit of {safe}%"
        ),
        SustainabilityVerdict::ExceedsSafeLimits => format!(
            "RISKY: withdrawal rate {rate}% exceeds the safe limit of {safe}%; reduce withdrawals or add to the corpus"
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
