use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finplan_core::loans::amortization::{self, LoanInput, PrepaymentEvent, PrepaymentPolicy};
use finplan_core::loans::comparison::{self, LoanComparisonInput};

use crate::input;

/// Arguments for loan analysis
#[derive(Args)]
pub struct LoanArgs {
    /// Path to a JSON/YAML loan request
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub tenure_months: Option<u32>,

    /// Prepayment as MONTH:AMOUNT[:shorten|reduce], repeatable
    #[arg(long = "prepayment")]
    pub prepayments: Vec<String>,

    /// Drop the month-by-month schedule from the output
    #[arg(long)]
    pub summary_only: bool,
}

/// Arguments for loan comparison
#[derive(Args)]
pub struct CompareLoansArgs {
    /// Path to a JSON/YAML file with an `options` list of 2-5 loans
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = match input::load(args.input.as_deref())? {
        Some(loan) => loan,
        None => LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            tenure_months: args
                .tenure_months
                .ok_or("--tenure-months is required (or provide --input)")?,
            prepayments: args
                .prepayments
                .iter()
                .map(|event| parse_prepayment(event))
                .collect::<Result<Vec<_>, _>>()?,
        },
    };

    let mut result = amortization::analyze_loan(&loan_input);
    if args.summary_only {
        result.result.schedule.clear();
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare_loans(args: CompareLoansArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison_input: LoanComparisonInput =
        input::require(args.input.as_deref(), "compare-loans")?;
    let result = comparison::compare_loans(&comparison_input)?;
    Ok(serde_json::to_value(result)?)
}

/// `MONTH:AMOUNT[:POLICY]`, policy defaulting to shorten.
fn parse_prepayment(raw: &str) -> Result<PrepaymentEvent, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(format!("Invalid prepayment '{raw}'. Use MONTH:AMOUNT[:shorten|reduce]").into());
    }
    let month: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid prepayment month '{}'", parts[0]))?;
    let amount: Decimal = parts[1]
        .parse()
        .map_err(|_| format!("Invalid prepayment amount '{}'", parts[1]))?;
    let policy = match parts.get(2).map(|p| p.to_lowercase()).as_deref() {
        None | Some("shorten") | Some("tenure") => PrepaymentPolicy::ShortenTenure,
        Some("reduce") | Some("emi") => PrepaymentPolicy::ReduceInstallment,
        Some(other) => {
            return Err(format!("Unknown prepayment policy '{other}'. Use: shorten, reduce").into())
        }
    };
    Ok(PrepaymentEvent {
        month,
        amount,
        policy,
    })
}
