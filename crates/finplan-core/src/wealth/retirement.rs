use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::guard::{out_of_range, Guard, MAX_HORIZON_YEARS};
use crate::precision::{percent_to_fraction, round2};
use crate::time_value::{
    annuity_future_value, annuity_present_value, future_value, inflate, payment_for_future_value,
};
use crate::types::{with_metadata, ChartPoint, ComputationOutput, Money, Percent};

const METHODOLOGY: &str = "Retirement Corpus Planning (inflated expense annuity, monthly SIP)";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for retirement corpus planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    /// Monthly expense in today's money.
    pub current_monthly_expense: Money,
    pub inflation_percent: Percent,
    pub pre_retirement_return_percent: Percent,
    pub post_retirement_return_percent: Percent,
    #[serde(default)]
    pub existing_corpus: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetirementPhase {
    Accumulation,
    Retirement,
}

/// A single year of the corpus trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementYear {
    pub year: u32,
    pub age: u32,
    pub phase: RetirementPhase,
    pub corpus_at_start: Money,
    pub contribution: Money,
    pub withdrawal: Money,
    pub investment_return: Money,
    pub corpus_at_end: Money,
}

/// Top-level output from `plan_retirement`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetirementOutput {
    pub years_to_retirement: u32,
    pub years_in_retirement: u32,
    /// Today's monthly expense inflated to the retirement date.
    pub inflated_monthly_expense: Money,
    pub inflated_annual_expense: Money,
    pub required_corpus: Money,
    pub projected_existing_corpus: Money,
    pub shortfall: Money,
    pub required_monthly_sip: Money,
    pub total_sip_contribution: Money,
    pub accumulation_years: Vec<RetirementYear>,
    pub retirement_years: Vec<RetirementYear>,
    pub corpus_chart: Vec<ChartPoint>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Size the corpus needed at retirement and the monthly SIP that closes any
/// gap left by the existing savings.
///
/// The inflated monthly expense is funded as a level monthly annuity over the
/// retirement years at the post-retirement return. Existing savings compound
/// annually at the pre-retirement return.
pub fn plan_retirement(input: &RetirementInput) -> ComputationOutput<RetirementOutput> {
    let start = Instant::now();
    let assumptions = serde_json::json!({
        "current_age": input.current_age,
        "retirement_age": input.retirement_age,
        "life_expectancy": input.life_expectancy,
        "current_monthly_expense": input.current_monthly_expense.to_string(),
        "inflation_percent": input.inflation_percent.to_string(),
        "pre_retirement_return_percent": input.pre_retirement_return_percent.to_string(),
        "post_retirement_return_percent": input.post_retirement_return_percent.to_string(),
        "existing_corpus": input.existing_corpus.to_string(),
    });

    let years_to_retirement = input.retirement_age.saturating_sub(input.current_age);
    let years_in_retirement = input.life_expectancy.saturating_sub(input.retirement_age);

    let guard = Guard::new()
        .require(
            input.retirement_age > input.current_age,
            "retirement_age",
            "must be greater than current_age",
        )
        .require(
            input.life_expectancy >= input.retirement_age,
            "life_expectancy",
            "must not be less than retirement_age",
        )
        .at_most(years_to_retirement, MAX_HORIZON_YEARS, "years_to_retirement")
        .at_most(years_in_retirement, MAX_HORIZON_YEARS, "years_in_retirement");
    if let Some(empty) = guard.reject(METHODOLOGY, &assumptions, start) {
        return empty;
    }

    let mut warnings = Vec::new();
    if input.existing_corpus < Decimal::ZERO {
        warnings.push("existing_corpus is negative; treated as zero".to_string());
    }

    match plan(input, years_to_retirement, years_in_retirement) {
        Some(output) => {
            let elapsed = start.elapsed().as_micros() as u64;
            with_metadata(METHODOLOGY, &assumptions, warnings, elapsed, output)
        }
        None => out_of_range("required_corpus", METHODOLOGY, &assumptions, start),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn plan(
    input: &RetirementInput,
    years_to_retirement: u32,
    years_in_retirement: u32,
) -> Option<RetirementOutput> {
    let inflated_monthly = inflate(
        input.current_monthly_expense,
        input.inflation_percent,
        years_to_retirement,
    )?;
    let required_corpus = annuity_present_value(
        inflated_monthly,
        input.post_retirement_return_percent,
        years_in_retirement * 12,
    )?;
    let projected_existing = future_value(
        input.existing_corpus,
        input.pre_retirement_return_percent,
        Decimal::from(years_to_retirement),
    )?;
    let shortfall = required_corpus
        .checked_sub(projected_existing)?
        .max(Decimal::ZERO);
    let sip = payment_for_future_value(
        shortfall,
        input.pre_retirement_return_percent,
        years_to_retirement * 12,
    )?;
    let annual_expense = inflated_monthly.checked_mul(Decimal::from(12))?;

    let accumulation_years = accumulation_trajectory(input, years_to_retirement, sip)?;
    let corpus_at_retirement = accumulation_years
        .last()
        .map(|y| y.corpus_at_end)
        .unwrap_or(Decimal::ZERO);
    let retirement_years = retirement_trajectory(
        input,
        years_to_retirement,
        years_in_retirement,
        corpus_at_retirement,
        annual_expense,
    )?;

    let corpus_chart = accumulation_years
        .iter()
        .chain(retirement_years.iter())
        .map(|y| ChartPoint::new(format!("Age {}", y.age), y.corpus_at_end))
        .collect();

    tracing::debug!(
        years_to_retirement,
        years_in_retirement,
        required = %required_corpus,
        shortfall = %shortfall,
        sip = %sip,
        "retirement plan computed"
    );

    Some(RetirementOutput {
        years_to_retirement,
        years_in_retirement,
        inflated_monthly_expense: round2(inflated_monthly),
        inflated_annual_expense: round2(annual_expense),
        required_corpus: round2(required_corpus),
        projected_existing_corpus: round2(projected_existing),
        shortfall: round2(shortfall),
        required_monthly_sip: round2(sip),
        total_sip_contribution: round2(sip.checked_mul(Decimal::from(years_to_retirement * 12))?),
        accumulation_years,
        retirement_years,
        corpus_chart,
    })
}

/// Existing corpus compounding annually plus a year of monthly SIP deposits.
fn accumulation_trajectory(
    input: &RetirementInput,
    years_to_retirement: u32,
    sip: Money,
) -> Option<Vec<RetirementYear>> {
    let annual_rate = percent_to_fraction(input.pre_retirement_return_percent);
    let yearly_contribution = sip.checked_mul(Decimal::from(12))?;
    let sip_growth = annuity_future_value(sip, input.pre_retirement_return_percent, 12)?
        .checked_sub(yearly_contribution)?;

    let mut corpus = input.existing_corpus.max(Decimal::ZERO);
    let mut years = Vec::with_capacity(years_to_retirement as usize);
    for year in 1..=years_to_retirement {
        let opening = corpus;
        let investment_return = opening.checked_mul(annual_rate)?.checked_add(sip_growth)?;
        corpus = opening
            .checked_add(yearly_contribution)?
            .checked_add(investment_return)?;
        years.push(RetirementYear {
            year,
            age: input.current_age + year,
            phase: RetirementPhase::Accumulation,
            corpus_at_start: round2(opening),
            contribution: round2(yearly_contribution),
            withdrawal: Decimal::ZERO,
            investment_return: round2(investment_return),
            corpus_at_end: round2(corpus),
        });
    }
    Some(years)
}

/// Annual fold over the retirement years: the opening corpus earns the
/// post-retirement return, then a year of the inflated expense is withdrawn,
/// capped at what is available. The corpus never goes below zero.
fn retirement_trajectory(
    input: &RetirementInput,
    years_to_retirement: u32,
    years_in_retirement: u32,
    corpus_at_retirement: Money,
    annual_expense: Money,
) -> Option<Vec<RetirementYear>> {
    let annual_rate = percent_to_fraction(input.post_retirement_return_percent);
    let mut corpus = corpus_at_retirement;
    let mut years = Vec::with_capacity(years_in_retirement as usize);
    for year in 1..=years_in_retirement {
        let opening = corpus;
        let investment_return = opening.checked_mul(annual_rate)?;
        let available = opening.checked_add(investment_return)?;
        let withdrawal = annual_expense.min(available).max(Decimal::ZERO);
        corpus = (available - withdrawal).max(Decimal::ZERO);
        years.push(RetirementYear {
            year: years_to_retirement + year,
            age: input.retirement_age + year,
            phase: RetirementPhase::Retirement,
            corpus_at_start: round2(opening),
            contribution: Decimal::ZERO,
            withdrawal: round2(withdrawal),
            investment_return: round2(investment_return),
            corpus_at_end: round2(corpus),
        });
    }
    Some(years)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
