use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::guard::{out_of_range, Guard, MAX_HORIZON_YEARS};
use crate::precision::{checked_sum, percent_of, percent_to_fraction, round2, safe_divide};
use crate::types::{with_metadata, ChartPoint, ComputationOutput, Money, Percent};

const METHODOLOGY: &str = "Household Cash-flow Projection (annual growth of income and expenses)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowItem {
    pub name: String,
    pub monthly_amount: Money,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowPlanInput {
    pub incomes: Vec<CashFlowItem>,
    #[serde(default)]
    pub expenses: Vec<CashFlowItem>,
    pub projection_years: u32,
    #[serde(default)]
    pub income_growth_percent: Percent,
    #[serde(default)]
    pub expense_growth_percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowYear {
    pub year: u32,
    pub monthly_income: Money,
    pub monthly_expense: Money,
    pub monthly_net: Money,
    pub annual_income: Money,
    pub annual_expense: Money,
    pub annual_savings: Money,
    pub savings_rate: Percent,
    pub cumulative_savings: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemShare {
    pub name: String,
    pub monthly_amount: Money,
    pub percentage: Percent,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashFlowPlanOutput {
    pub current_monthly_income: Money,
    pub current_monthly_expense: Money,
    pub current_net_cash_flow: Money,
    pub current_savings_rate: Percent,
    pub average_annual_income: Money,
    pub average_annual_expense: Money,
    pub total_savings: Money,
    pub average_savings_rate: Percent,
    pub projections: Vec<CashFlowYear>,
    pub income_breakdown: Vec<ItemShare>,
    pub expense_breakdown: Vec<ItemShare>,
    pub income_vs_expense_chart: Vec<ChartPoint>,
    pub savings_chart: Vec<ChartPoint>,
    pub savings_rate_chart: Vec<ChartPoint>,
}

/// Net savings as a percentage of income, 0 without income.
pub fn savings_rate(net: Money, income: Money) -> Percent {
    if income.is_zero() {
        return Decimal::ZERO;
    }
    round2(percent_of(net, income))
}

pub fn project_cash_flow(input: &CashFlowPlanInput) -> ComputationOutput<CashFlowPlanOutput> {
    let start = Instant::now();
    let assumptions = serde_json::json!({
        "income_items": input.incomes.len(),
        "expense_items": input.expenses.len(),
        "projection_years": input.projection_years,
        "income_growth_percent": input.income_growth_percent.to_string(),
        "expense_growth_percent": input.expense_growth_percent.to_string(),
    });

    let guard = Guard::new()
        .require(input.projection_years > 0, "projection_years", "must be at least 1")
        .require(!input.incomes.is_empty(), "incomes", "at least one income item is required")
        .at_most(input.projection_years, MAX_HORIZON_YEARS, "projection_years");
    if let Some(empty) = guard.reject(METHODOLOGY, &assumptions, start) {
        return empty;
    }

    let mut warnings = Vec::new();
    for item in input.incomes.iter().chain(input.expenses.iter()) {
        if item.monthly_amount < Decimal::ZERO {
            warnings.push(format!("item '{}' has a negative monthly amount", item.name));
        }
    }

    match project(input) {
        Some(output) => {
            let elapsed = start.elapsed().as_micros() as u64;
            with_metadata(METHODOLOGY, &assumptions, warnings, elapsed, output)
        }
        None => out_of_range("projections", METHODOLOGY, &assumptions, start),
    }
}

fn project(input: &CashFlowPlanInput) -> Option<CashFlowPlanOutput> {
    let income = total(&input.incomes)?;
    let expense = total(&input.expenses)?;
    let net = income.checked_sub(expense)?;

    let income_factor = Decimal::ONE + percent_to_fraction(input.income_growth_percent);
    let expense_factor = Decimal::ONE + percent_to_fraction(input.expense_growth_percent);
    let twelve = Decimal::from(12);

    let mut projections = Vec::with_capacity(input.projection_years as usize);
    let mut monthly_income = income;
    let mut monthly_expense = expense;
    let mut cumulative = Decimal::ZERO;
    for year in 1..=input.projection_years {
        let monthly_net = monthly_income.checked_sub(monthly_expense)?;
        let annual_savings = monthly_net.checked_mul(twelve)?;
        cumulative = cumulative.checked_add(annual_savings)?;
        projections.push(CashFlowYear {
            year,
            monthly_income: round2(monthly_income),
            monthly_expense: round2(monthly_expense),
            monthly_net: round2(monthly_net),
            annual_income: round2(monthly_income.checked_mul(twelve)?),
            annual_expense: round2(monthly_expense.checked_mul(twelve)?),
            annual_savings: round2(annual_savings),
            savings_rate: savings_rate(monthly_net, monthly_income),
            cumulative_savings: round2(cumulative),
        });
        monthly_income = monthly_income.checked_mul(income_factor)?;
        monthly_expense = monthly_expense.checked_mul(expense_factor)?;
    }

    let years = Decimal::from(input.projection_years);
    let average = |f: fn(&CashFlowYear) -> Decimal| {
        checked_sum(projections.iter().map(f)).map(|sum| round2(safe_divide(sum, years)))
    };
    let average_annual_income = average(|p| p.annual_income)?;
    let average_annual_expense = average(|p| p.annual_expense)?;
    let average_savings_rate = average(|p| p.savings_rate)?;

    let mut income_vs_expense_chart = Vec::with_capacity(projections.len() * 2);
    for p in &projections {
        income_vs_expense_chart.push(ChartPoint::new(format!("Year {} Income", p.year), p.annual_income));
        income_vs_expense_chart.push(ChartPoint::new(format!("Year {} Expense", p.year), p.annual_expense));
    }
    let savings_chart = projections
        .iter()
        .map(|p| ChartPoint::new(format!("Year {}", p.year), p.cumulative_savings))
        .collect();
    let savings_rate_chart = projections
        .iter()
        .map(|p| ChartPoint::new(format!("Year {}", p.year), p.savings_rate))
        .collect();

    tracing::debug!(
        years = input.projection_years,
        total_savings = %cumulative,
        "cash-flow projection complete"
    );

    Some(CashFlowPlanOutput {
        current_monthly_income: round2(income),
        current_monthly_expense: round2(expense),
        current_net_cash_flow: round2(net),
        current_savings_rate: savings_rate(net, income),
        average_annual_income,
        average_annual_expense,
        total_savings: round2(cumulative),
        average_savings_rate,
        income_breakdown: breakdown(&input.incomes, income),
        expense_breakdown: breakdown(&input.expenses, expense),
        projections,
        income_vs_expense_chart,
        savings_chart,
        savings_rate_chart,
    })
}

fn total(items: &[CashFlowItem]) -> Option<Money> {
    checked_sum(items.iter().map(|i| i.monthly_amount))
}

fn breakdown(items: &[CashFlowItem], total: Money) -> Vec<ItemShare> {
    items
        .iter()
        .map(|item| ItemShare {
            name: item.name.clone(),
            monthly_amount: round2(item.monthly_amount),
            percentage: round2(percent_of(item.monthly_amount, total)),
            category: item.category.clone(),
        })
        .collect()
}
