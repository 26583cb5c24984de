mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::loans::{CompareLoansArgs, LoanArgs};
use commands::portfolio::{AllocationArgs, CagrArgs, FifoArgs, PerformanceArgs, XirrArgs};
use commands::wealth::{CashflowArgs, RetirementArgs, StepUpArgs, WithdrawalArgs};
use config::CliConfig;

/// Deterministic personal-finance calculations
#[derive(Parser)]
#[command(
    name = "finplan",
    version,
    about = "Deterministic personal-finance calculations",
    long_about = "A CLI for personal-finance planning with exact decimal arithmetic. \
                  Supports loan amortization with prepayments, step-up SIPs, retirement \
                  corpus sizing, withdrawal sustainability, XIRR/CAGR and FIFO gains."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (overrides the config file)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// YAML config file with defaults for output and logging
    #[arg(long, global = true, env = "FINPLAN_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Loan EMI and amortization schedule, with optional prepayments
    Loan(LoanArgs),
    /// Compare 2-5 loans and pick the cheapest
    CompareLoans(CompareLoansArgs),
    /// Project a SIP whose contribution steps up every year
    StepUp(StepUpArgs),
    /// Size the retirement corpus and the monthly SIP needed
    Retirement(RetirementArgs),
    /// Simulate a systematic withdrawal plan
    Withdrawal(WithdrawalArgs),
    /// Household income / expense projection
    Cashflow(CashflowArgs),
    /// XIRR of dated cash flows
    Xirr(XirrArgs),
    /// CAGR and absolute return between two values
    Cagr(CagrArgs),
    /// Realised gain of a sale matched FIFO against purchase lots
    Fifo(FifoArgs),
    /// Rebalancing trades towards target weights
    Allocation(AllocationArgs),
    /// XIRR, CAGR and absolute return of a transaction history
    Performance(PerformanceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    /// Single-line JSON without the run-specific metadata block
    Compact,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => match CliConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                process::exit(2);
            }
        },
        None => CliConfig::default(),
    };
    init_tracing(&config.log_filter);
    let format = cli.output.unwrap_or(config.output);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Loan(args) => commands::loans::run_loan(args),
        Commands::CompareLoans(args) => commands::loans::run_compare_loans(args),
        Commands::StepUp(args) => commands::wealth::run_step_up(args),
        Commands::Retirement(args) => commands::wealth::run_retirement(args),
        Commands::Withdrawal(args) => commands::wealth::run_withdrawal(args),
        Commands::Cashflow(args) => commands::wealth::run_cashflow(args),
        Commands::Xirr(args) => commands::portfolio::run_xirr(args),
        Commands::Cagr(args) => commands::portfolio::run_cagr(args),
        Commands::Fifo(args) => commands::portfolio::run_fifo(args),
        Commands::Allocation(args) => commands::portfolio::run_allocation(args),
        Commands::Performance(args) => commands::portfolio::run_performance(args),
        Commands::Version => {
            println!("finplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
