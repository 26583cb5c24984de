use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finplan_core::wealth::cashflow::{self, CashFlowPlanInput};
use finplan_core::wealth::retirement::{self, RetirementInput};
use finplan_core::wealth::step_up::{self, StepUpInput};
use finplan_core::wealth::withdrawal::{self, WithdrawalInput};

use crate::input;

/// Arguments for a step-up SIP projection
#[derive(Args)]
pub struct StepUpArgs {
    /// Path to a JSON/YAML request
    #[arg(long)]
    pub input: Option<String>,

    /// First-year monthly contribution
    #[arg(long)]
    pub monthly: Option<Decimal>,

    /// Expected annual return in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Investment horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Yearly increase of the contribution in percent
    #[arg(long, default_value = "0")]
    pub step_up: Decimal,
}

/// Arguments for retirement planning
#[derive(Args)]
pub struct RetirementArgs {
    /// Path to a JSON/YAML request
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub current_age: Option<u32>,

    #[arg(long)]
    pub retirement_age: Option<u32>,

    #[arg(long, default_value = "85")]
    pub life_expectancy: u32,

    /// Monthly expense in today's money
    #[arg(long)]
    pub monthly_expense: Option<Decimal>,

    /// Inflation in percent
    #[arg(long, default_value = "6")]
    pub inflation: Decimal,

    /// Return before retirement in percent
    #[arg(long, default_value = "12")]
    pub pre_return: Decimal,

    /// Return after retirement in percent
    #[arg(long, default_value = "8")]
    pub post_return: Decimal,

    /// Savings already set aside
    #[arg(long, default_value = "0")]
    pub existing_corpus: Decimal,
}

/// Arguments for a systematic withdrawal simulation
#[derive(Args)]
pub struct WithdrawalArgs {
    /// Path to a JSON/YAML request
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub corpus: Option<Decimal>,

    /// Initial monthly withdrawal
    #[arg(long)]
    pub withdrawal: Option<Decimal>,

    /// Expected annual return in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    #[arg(long)]
    pub years: Option<u32>,

    /// Inflation in percent
    #[arg(long)]
    pub inflation: Option<Decimal>,

    /// Grow the withdrawal with inflation every month
    #[arg(long)]
    pub inflation_adjusted: bool,

    /// Drop the month-by-month rows from the output
    #[arg(long)]
    pub summary_only: bool,
}

/// Arguments for a household cash-flow projection
#[derive(Args)]
pub struct CashflowArgs {
    /// Path to a JSON/YAML request with incomes, expenses and growth rates
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_step_up(args: StepUpArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: StepUpInput = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => StepUpInput {
            monthly_contribution: args
                .monthly
                .ok_or("--monthly is required (or provide --input)")?,
            annual_return_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            annual_step_up_percent: args.step_up,
        },
    };
    Ok(serde_json::to_value(step_up::project_step_up(&request))?)
}

pub fn run_retirement(args: RetirementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: RetirementInput = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => RetirementInput {
            current_age: args
                .current_age
                .ok_or("--current-age is required (or provide --input)")?,
            retirement_age: args
                .retirement_age
                .ok_or("--retirement-age is required (or provide --input)")?,
            life_expectancy: args.life_expectancy,
            current_monthly_expense: args
                .monthly_expense
                .ok_or("--monthly-expense is required (or provide --input)")?,
            inflation_percent: args.inflation,
            pre_retirement_return_percent: args.pre_return,
            post_retirement_return_percent: args.post_return,
            existing_corpus: args.existing_corpus,
        },
    };
    Ok(serde_json::to_value(retirement::plan_retirement(&request))?)
}

pub fn run_withdrawal(args: WithdrawalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: WithdrawalInput = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => WithdrawalInput {
            starting_corpus: args.corpus.ok_or("--corpus is required (or provide --input)")?,
            monthly_withdrawal: args
                .withdrawal
                .ok_or("--withdrawal is required (or provide --input)")?,
            annual_return_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            duration_years: args.years.ok_or("--years is required (or provide --input)")?,
            inflation_percent: args.inflation,
            inflation_adjusted: Some(args.inflation_adjusted),
        },
    };
    let mut result = withdrawal::simulate_withdrawals(&request);
    if args.summary_only {
        result.result.monthly_breakdown.clear();
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_cashflow(args: CashflowArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CashFlowPlanInput = input::require(args.input.as_deref(), "cashflow")?;
    Ok(serde_json::to_value(cashflow::project_cash_flow(&request))?)
}
