use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::guard::{out_of_range, Guard, MAX_HORIZON_MONTHS};
use crate::precision::{checked_sum, monthly_rate, percent_of, round2, ROUNDING_EPSILON};
use crate::time_value::installment;
use crate::types::{annual_samples, with_metadata, ChartPoint, ComputationOutput, Money, Percent, Rate};

const METHODOLOGY: &str = "Loan Amortization (reducing balance EMI with prepayments)";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What happens to the loan after a lump-sum prepayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepaymentPolicy {
    /// Keep the installment; the loan closes earlier.
    ShortenTenure,
    /// Keep the nominal tenure; re-derive a smaller installment.
    ReduceInstallment,
}

/// A lump-sum prepayment, posted after the regular payment of `month`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentEvent {
    /// 1-based month index, at most the nominal tenure.
    pub month: u32,
    pub amount: Money,
    pub policy: PrepaymentPolicy,
}

/// Input for loan analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    /// Annual interest rate as a percentage (8.5 = 8.5%).
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
    #[serde(default)]
    pub prepayments: Vec<PrepaymentEvent>,
}

/// One month of the amortization schedule.
///
/// `closing_balance = opening_balance - principal`. Any prepayment posted in
/// the same month is reported separately and reduces the next opening balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub year: u32,
    pub opening_balance: Money,
    pub installment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
    pub prepayment: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// Effect of the supplied prepayments versus the same loan without them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentImpact {
    pub total_prepayment: Money,
    pub interest_saved: Money,
    /// Nominal tenure minus the months actually scheduled (ShortenTenure).
    pub months_saved: u32,
    /// Installment on the final scheduled row (ReduceInstallment).
    pub new_installment: Money,
    pub original_total_cost: Money,
    pub new_total_cost: Money,
}

/// Output of loan analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanOutput {
    pub emi: Money,
    pub principal: Money,
    pub total_interest: Money,
    pub total_amount: Money,
    /// Total interest as a percentage of principal.
    pub interest_percentage: Percent,
    pub actual_tenure_months: u32,
    pub schedule: Vec<AmortizationRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepayment_impact: Option<PrepaymentImpact>,
    pub principal_repaid_chart: Vec<ChartPoint>,
    pub balance_chart: Vec<ChartPoint>,
}

// ---------------------------------------------------------------------------
// Schedule generation
// ---------------------------------------------------------------------------

/// Build the month-by-month schedule.
///
/// Interest is charged on the opening balance and rounded to 2 dp; the
/// principal part is the installment less interest, capped at the balance.
/// The row at the nominal tenure repays whatever balance remains so the loan
/// closes exactly. The loop stops as soon as the balance falls under
/// [`ROUNDING_EPSILON`]. `None` when a running total leaves the `Decimal` range.
pub fn generate_schedule(
    principal: Money,
    monthly: Rate,
    emi: Money,
    tenure_months: u32,
    prepayments: &[PrepaymentEvent],
) -> Option<Vec<AmortizationRow>> {
    let mut rows = Vec::with_capacity(tenure_months.min(MAX_HORIZON_MONTHS) as usize);
    let mut balance = principal;
    let mut current_installment = emi;
    let mut cumulative_interest = Decimal::ZERO;
    let mut cumulative_principal = Decimal::ZERO;

    for month in 1..=tenure_months {
        if balance <= ROUNDING_EPSILON {
            break;
        }

        let opening = balance;
        let interest = round2(opening.checked_mul(monthly)?);
        let mut principal_part = current_installment.checked_sub(interest)?;
        let mut paid = current_installment;

        if principal_part > opening || month == tenure_months {
            principal_part = opening;
            paid = opening.checked_add(interest)?;
        }

        balance = (opening - principal_part).max(Decimal::ZERO);
        cumulative_interest = cumulative_interest.checked_add(interest)?;
        cumulative_principal = cumulative_principal.checked_add(principal_part)?;
        let closing = balance;

        let mut prepaid = Decimal::ZERO;
        for event in prepayments.iter().filter(|e| e.month == month) {
            if event.amount <= Decimal::ZERO {
                continue;
            }
            let applied = event.amount.min(balance);
            balance -= applied;
            prepaid += applied;

            if event.policy == PrepaymentPolicy::ReduceInstallment {
                current_installment = installment(balance, monthly, tenure_months - month)?;
            }
        }

        rows.push(AmortizationRow {
            month,
            year: (month - 1) / 12 + 1,
            opening_balance: round2(opening),
            installment: round2(paid),
            interest,
            principal: round2(principal_part),
            closing_balance: round2(closing),
            prepayment: round2(prepaid),
            cumulative_interest: round2(cumulative_interest),
            cumulative_principal: round2(cumulative_principal),
        });
    }

    Some(rows)
}

fn total_interest(rows: &[AmortizationRow]) -> Option<Money> {
    checked_sum(rows.iter().map(|r| r.interest))
}

/// Compare a schedule with prepayments against the plain schedule of the same loan.
pub fn prepayment_impact(
    emi: Money,
    tenure_months: u32,
    original: &[AmortizationRow],
    with_prepayments: &[AmortizationRow],
) -> Option<PrepaymentImpact> {
    let total_prepayment = checked_sum(with_prepayments.iter().map(|r| r.prepayment))?;
    let new_interest = total_interest(with_prepayments)?;
    let new_principal = checked_sum(with_prepayments.iter().map(|r| r.principal))?;
    let scheduled = u32::try_from(with_prepayments.len()).unwrap_or(tenure_months);

    Some(PrepaymentImpact {
        total_prepayment: round2(total_prepayment),
        interest_saved: round2(total_interest(original)? - new_interest),
        months_saved: tenure_months.saturating_sub(scheduled),
        new_installment: with_prepayments
            .last()
            .map(|r| r.installment)
            .unwrap_or(Decimal::ZERO),
        original_total_cost: round2(emi.checked_mul(Decimal::from(tenure_months))?),
        new_total_cost: round2(checked_sum([new_interest, new_principal, total_prepayment])?),
    })
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Analyse a loan: EMI, full schedule, totals and (when prepayments are
/// supplied) their impact. Non-positive principal or a zero tenure produce
/// an all-zero result.
pub fn analyze_loan(input: &LoanInput) -> ComputationOutput<LoanOutput> {
    let start = Instant::now();
    let assumptions = serde_json::json!({
        "principal": input.principal.to_string(),
        "annual_rate_percent": input.annual_rate_percent.to_string(),
        "tenure_months": input.tenure_months,
        "prepayments": input.prepayments.len(),
    });

    let monthly = monthly_rate(input.annual_rate_percent);
    let emi = installment(input.principal, monthly, input.tenure_months);
    let guard = Guard::new()
        .positive(input.principal, "principal")
        .require(input.tenure_months > 0, "tenure_months", "must be at least 1 month")
        .at_most(input.tenure_months, MAX_HORIZON_MONTHS, "tenure_months")
        .in_range(emi.as_ref(), "emi");
    if let Some(empty) = guard.reject(METHODOLOGY, &assumptions, start) {
        return empty;
    }
    let emi = emi.unwrap_or_default();

    let mut warnings = Vec::new();
    for event in &input.prepayments {
        if event.month == 0 || event.month > input.tenure_months {
            warnings.push(format!(
                "Prepayment at month {} ignored: outside tenure 1..={}",
                event.month, input.tenure_months
            ));
        } else if event.amount <= Decimal::ZERO {
            warnings.push(format!(
                "Prepayment at month {} ignored: amount must be positive",
                event.month
            ));
        }
    }

    tracing::debug!(
        principal = %input.principal,
        rate = %input.annual_rate_percent,
        tenure = input.tenure_months,
        emi = %emi,
        "EMI computed"
    );

    match build_output(input, monthly, emi, &mut warnings) {
        Some(output) => {
            let elapsed = start.elapsed().as_micros() as u64;
            with_metadata(METHODOLOGY, &assumptions, warnings, elapsed, output)
        }
        None => out_of_range("schedule", METHODOLOGY, &assumptions, start),
    }
}

fn build_output(
    input: &LoanInput,
    monthly: Rate,
    emi: Money,
    warnings: &mut Vec<String>,
) -> Option<LoanOutput> {
    let schedule = generate_schedule(
        input.principal,
        monthly,
        emi,
        input.tenure_months,
        &input.prepayments,
    )?;

    let prepayment_impact = if input.prepayments.is_empty() {
        None
    } else {
        let original = generate_schedule(input.principal, monthly, emi, input.tenure_months, &[])?;
        if let Some(last) = schedule.last() {
            for event in &input.prepayments {
                if event.month > last.month && event.month <= input.tenure_months {
                    warnings.push(format!(
                        "Prepayment at month {} not applied: loan closed at month {}",
                        event.month, last.month
                    ));
                }
            }
        }
        Some(prepayment_impact(emi, input.tenure_months, &original, &schedule)?)
    };

    let total_interest = total_interest(&schedule)?;
    let actual_tenure_months = schedule.last().map(|r| r.month).unwrap_or(0);
    tracing::debug!(
        rows = schedule.len(),
        total_interest = %total_interest,
        "amortization schedule generated"
    );

    let principal_repaid_chart = annual_samples(
        &schedule,
        |r| format!("Month {}", r.month),
        |r| r.cumulative_principal,
    );
    let balance_chart = annual_samples(
        &schedule,
        |r| format!("Month {}", r.month),
        |r| r.closing_balance,
    );

    Some(LoanOutput {
        emi,
        principal: round2(input.principal),
        total_interest: round2(total_interest),
        total_amount: round2(input.principal.checked_add(total_interest)?),
        interest_percentage: round2(percent_of(total_interest, input.principal)),
        actual_tenure_months,
        schedule,
        prepayment_impact,
        principal_repaid_chart,
        balance_chart,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn loan(principal: Decimal, rate: Decimal, months: u32) -> LoanInput {
        LoanInput {
            principal,
            annual_rate_percent: rate,
            tenure_months: months,
            prepayments: vec![],
        }
    }

    #[test]
    fn test_scenario_five_year_loan() {
        let out = analyze_loan(&loan(dec!(500_000), dec!(10), 60)).result;
        assert_eq!(out.emi, dec!(10623.52));
        assert_eq!(out.schedule.len(), 60);
        let expected_interest = out.emi * dec!(60) - dec!(500_000);
        assert!((out.total_interest - expected_interest).abs() < dec!(1));
        assert!(out.prepayment_impact.is_none());
    }

    #[test]
    fn test_first_row_split() {
        let out = analyze_loan(&loan(dec!(100_000), dec!(12), 12)).result;
        let first = &out.schedule[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.year, 1);
        assert_eq!(first.opening_balance, dec!(100_000));
        assert_eq!(first.interest, dec!(1_000));
        assert_eq!(first.principal, out.emi - dec!(1_000));
        assert_eq!(first.closing_balance, first.opening_balance - first.principal);
    }

    #[test]
    fn test_schedule_closes_exactly() {
        let out = analyze_loan(&loan(dec!(2_500_000), dec!(9.25), 240)).result;
        let last = out.schedule.last().unwrap();
        assert_eq!(last.closing_balance, Decimal::ZERO);
        let principal_sum: Decimal = out.schedule.iter().map(|r| r.principal).sum();
        assert_eq!(principal_sum, dec!(2_500_000));
    }

    #[test]
    fn test_row_identity_holds_on_regular_rows() {
        let out = analyze_loan(&loan(dec!(750_000), dec!(8), 120)).result;
        for row in &out.schedule[..out.schedule.len() - 1] {
            assert_eq!(row.interest + row.principal, row.installment);
            assert_eq!(row.closing_balance, row.opening_balance - row.principal);
        }
    }

    #[test]
    fn test_year_index() {
        let out = analyze_loan(&loan(dec!(100_000), dec!(10), 36)).result;
        assert_eq!(out.schedule[11].year, 1);
        assert_eq!(out.schedule[12].year, 2);
        assert_eq!(out.schedule[35].year, 3);
    }

    #[test]
    fn test_zero_rate_loan() {
        let out = analyze_loan(&loan(dec!(120_000), Decimal::ZERO, 12)).result;
        assert_eq!(out.emi, dec!(10_000));
        assert_eq!(out.schedule.len(), 12);
        assert!(out.schedule.iter().all(|r| r.interest.is_zero()));
        assert_eq!(out.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_inputs_yield_zero_result() {
        let out = analyze_loan(&loan(Decimal::ZERO, dec!(10), 12));
        assert_eq!(out.result.emi, Decimal::ZERO);
        assert!(out.result.schedule.is_empty());
        assert_eq!(out.warnings.len(), 1);

        let out = analyze_loan(&loan(dec!(10_000), dec!(10), 0));
        assert!(out.result.schedule.is_empty());
        assert_eq!(out.result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_extreme_rate_is_rejected_without_panicking() {
        let out = analyze_loan(&loan(dec!(100_000), dec!(300), 360));
        assert_eq!(out.result.emi, Decimal::ZERO);
        assert!(out.result.schedule.is_empty());
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("emi") && w.contains("decimal range")));
    }

    #[test]
    fn test_tenure_beyond_horizon_is_rejected() {
        let out = analyze_loan(&loan(dec!(100_000), dec!(12), 7000));
        assert!(out.result.schedule.is_empty());
        assert!(out.warnings.iter().any(|w| w.contains("tenure_months")));

        let out = analyze_loan(&loan(dec!(100_000), Decimal::ZERO, u32::MAX));
        assert!(out.result.schedule.is_empty());
        assert_eq!(out.result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_longest_supported_tenure() {
        let out = analyze_loan(&loan(dec!(100_000), dec!(12), MAX_HORIZON_MONTHS));
        assert!(out.warnings.is_empty());
        let schedule = &out.result.schedule;
        assert!(!schedule.is_empty());
        assert!(schedule.len() <= MAX_HORIZON_MONTHS as usize);
        assert_eq!(schedule.last().unwrap().closing_balance, Decimal::ZERO);

        let flat = analyze_loan(&loan(dec!(120_000), Decimal::ZERO, MAX_HORIZON_MONTHS)).result;
        assert_eq!(flat.emi, dec!(100));
        assert_eq!(flat.schedule.len(), MAX_HORIZON_MONTHS as usize);
    }

    #[test]
    fn test_shorten_tenure_prepayment() {
        let mut input = loan(dec!(1_000_000), dec!(9), 120);
        input.prepayments.push(PrepaymentEvent {
            month: 12,
            amount: dec!(200_000),
            policy: PrepaymentPolicy::ShortenTenure,
        });
        let out = analyze_loan(&input).result;
        let impact = out.prepayment_impact.unwrap();

        assert!(out.schedule.len() < 120);
        assert!(impact.months_saved > 0);
        assert!(impact.interest_saved > Decimal::ZERO);
        assert_eq!(impact.total_prepayment, dec!(200_000));
        // installment unchanged after the event
        assert_eq!(out.schedule[12].installment, out.emi);
        // prepayment reported on the event row, next row opens lower
        let event_row = &out.schedule[11];
        assert_eq!(event_row.prepayment, dec!(200_000));
        assert_eq!(
            out.schedule[12].opening_balance,
            event_row.closing_balance - dec!(200_000)
        );
    }

    #[test]
    fn test_reduce_installment_prepayment() {
        let mut input = loan(dec!(1_000_000), dec!(9), 120);
        input.prepayments.push(PrepaymentEvent {
            month: 24,
            amount: dec!(300_000),
            policy: PrepaymentPolicy::ReduceInstallment,
        });
        let out = analyze_loan(&input).result;
        let impact = out.prepayment_impact.unwrap();

        assert_eq!(out.schedule.len(), 120);
        assert_eq!(impact.months_saved, 0);
        assert!(out.schedule[24].installment < out.emi);
        assert!(impact.new_installment < out.emi);
        assert!(impact.interest_saved > Decimal::ZERO);
    }

    #[test]
    fn test_prepayment_exceeding_balance_closes_loan() {
        let mut input = loan(dec!(100_000), dec!(10), 60);
        input.prepayments.push(PrepaymentEvent {
            month: 6,
            amount: dec!(1_000_000),
            policy: PrepaymentPolicy::ShortenTenure,
        });
        let out = analyze_loan(&input).result;
        assert_eq!(out.schedule.len(), 6);
        let last = out.schedule.last().unwrap();
        assert_eq!(last.prepayment, last.closing_balance);
        assert_eq!(out.prepayment_impact.unwrap().months_saved, 54);
    }

    #[test]
    fn test_prepayment_outside_tenure_warns() {
        let mut input = loan(dec!(100_000), dec!(10), 12);
        input.prepayments.push(PrepaymentEvent {
            month: 13,
            amount: dec!(5_000),
            policy: PrepaymentPolicy::ShortenTenure,
        });
        let out = analyze_loan(&input);
        assert_eq!(out.result.schedule.len(), 12);
        assert!(out.warnings.iter().any(|w| w.contains("outside tenure")));
        let impact = out.result.prepayment_impact.unwrap();
        assert_eq!(impact.interest_saved, Decimal::ZERO);
    }

    #[test]
    fn test_charts_sample_annually() {
        let out = analyze_loan(&loan(dec!(100_000), dec!(10), 24)).result;
        let labels: Vec<&str> = out.balance_chart.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Month 1", "Month 13", "Month 24"]);
        assert_eq!(out.balance_chart.last().unwrap().value, Decimal::ZERO);
    }
}
