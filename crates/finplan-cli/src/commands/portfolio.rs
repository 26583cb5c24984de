use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finplan_core::portfolio::allocation::{self, AllocationInput};
use finplan_core::portfolio::fifo::{self, FifoSaleInput};
use finplan_core::portfolio::returns::{self, GrowthInput, PerformanceInput, XirrInput};
use finplan_core::CashFlowPoint;

use crate::input;

/// Arguments for XIRR
#[derive(Args)]
pub struct XirrArgs {
    /// Path to a JSON/YAML request with a `flows` list
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated DATE:AMOUNT pairs, outflows negative
    /// (e.g. "2023-01-01:-100000,2024-01-01:120000")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub flows: Option<Vec<String>>,

    /// Starting rate as a fraction (default 0.10)
    #[arg(long)]
    pub guess: Option<Decimal>,

    #[arg(long)]
    pub max_iterations: Option<u32>,
}

/// Arguments for CAGR / absolute return
#[derive(Args)]
pub struct CagrArgs {
    #[arg(long)]
    pub beginning: Decimal,

    #[arg(long)]
    pub ending: Decimal,

    /// Holding period in years (fractions allowed)
    #[arg(long)]
    pub years: Decimal,
}

/// Arguments for FIFO lot matching
#[derive(Args)]
pub struct FifoArgs {
    /// Path to a JSON/YAML request with lots, quantity_to_sell and sale_price
    #[arg(long)]
    pub input: Option<String>,

    /// Override the quantity to sell from the input
    #[arg(long)]
    pub quantity: Option<Decimal>,

    /// Override the sale price from the input
    #[arg(long)]
    pub price: Option<Decimal>,
}

/// Arguments for allocation rebalancing
#[derive(Args)]
pub struct AllocationArgs {
    /// Path to a JSON/YAML request with holdings and targets
    #[arg(long)]
    pub input: Option<String>,

    /// Fresh money to deploy (overrides the input)
    #[arg(long)]
    pub fresh_investment: Option<Decimal>,
}

/// Arguments for the portfolio performance summary
#[derive(Args)]
pub struct PerformanceArgs {
    /// Path to a JSON/YAML request with transactions, current value and valuation date
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_xirr(args: XirrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: XirrInput = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => {
            let pairs = args
                .flows
                .ok_or("--flows is required (or provide --input)")?;
            XirrInput {
                flows: pairs
                    .iter()
                    .map(|pair| parse_flow(pair))
                    .collect::<Result<Vec<_>, _>>()?,
                guess: None,
                max_iterations: None,
                tolerance: None,
            }
        }
    };
    if args.guess.is_some() {
        request.guess = args.guess;
    }
    if args.max_iterations.is_some() {
        request.max_iterations = args.max_iterations;
    }
    let result = returns::compute_xirr(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_cagr(args: CagrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = GrowthInput {
        beginning_value: args.beginning,
        ending_value: args.ending,
        years: args.years,
    };
    Ok(serde_json::to_value(returns::compute_growth(&request))?)
}

pub fn run_fifo(args: FifoArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: FifoSaleInput = input::require(args.input.as_deref(), "fifo")?;
    if let Some(quantity) = args.quantity {
        request.quantity_to_sell = quantity;
    }
    if let Some(price) = args.price {
        request.sale_price = price;
    }
    let result = fifo::match_fifo(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_allocation(args: AllocationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: AllocationInput = input::require(args.input.as_deref(), "allocation")?;
    if args.fresh_investment.is_some() {
        request.fresh_investment = args.fresh_investment;
    }
    Ok(serde_json::to_value(allocation::rebalance(&request))?)
}

pub fn run_performance(args: PerformanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PerformanceInput = input::require(args.input.as_deref(), "performance")?;
    let result = returns::summarize_performance(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// `YYYY-MM-DD:AMOUNT`
fn parse_flow(pair: &str) -> Result<CashFlowPoint, Box<dyn std::error::Error>> {
    let (date, amount) = pair
        .trim()
        .split_once(':')
        .ok_or_else(|| format!("Invalid cash flow '{pair}'. Use YYYY-MM-DD:AMOUNT"))?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{date}': {e}"))?;
    let amount: Decimal = amount
        .parse()
        .map_err(|_| format!("Invalid amount '{amount}'"))?;
    Ok(CashFlowPoint { date, amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_flow() {
        let flow = parse_flow("2023-01-01:-100000").unwrap();
        assert_eq!(flow.date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(flow.amount, dec!(-100000));
    }

    #[test]
    fn test_parse_flow_rejects_bad_date() {
        assert!(parse_flow("2023-13-01:100").is_err());
        assert!(parse_flow("100").is_err());
    }
}
