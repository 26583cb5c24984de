use napi::Result as NapiResult;
use napi_derive::napi;

use finplan_core::loans::{amortization, comparison};
use finplan_core::portfolio::{allocation, fifo, returns};
use finplan_core::wealth::{cashflow, retirement, step_up, withdrawal};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let input: amortization::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::analyze_loan(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_loans(input_json: String) -> NapiResult<String> {
    let input: comparison::LoanComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = comparison::compare_loans(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Wealth
// ---------------------------------------------------------------------------

#[napi]
pub fn project_step_up(input_json: String) -> NapiResult<String> {
    let input: step_up::StepUpInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = step_up::project_step_up(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn plan_retirement(input_json: String) -> NapiResult<String> {
    let input: retirement::RetirementInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = retirement::plan_retirement(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_withdrawals(input_json: String) -> NapiResult<String> {
    let input: withdrawal::WithdrawalInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = withdrawal::simulate_withdrawals(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_cash_flow(input_json: String) -> NapiResult<String> {
    let input: cashflow::CashFlowPlanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = cashflow::project_cash_flow(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_xirr(input_json: String) -> NapiResult<String> {
    let input: returns::XirrInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = returns::compute_xirr(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compute_growth(input_json: String) -> NapiResult<String> {
    let input: returns::GrowthInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = returns::compute_growth(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_performance(input_json: String) -> NapiResult<String> {
    let input: returns::PerformanceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = returns::summarize_performance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn match_fifo(input_json: String) -> NapiResult<String> {
    let input: fifo::FifoSaleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fifo::match_fifo(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn rebalance_allocation(input_json: String) -> NapiResult<String> {
    let input: allocation::AllocationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = allocation::rebalance(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}
