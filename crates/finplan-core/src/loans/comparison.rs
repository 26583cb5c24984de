use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::amortization::{analyze_loan, LoanInput, LoanOutput};
use crate::error::FinPlanError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FinPlanResult;

const MIN_OPTIONS: usize = 2;
const MAX_OPTIONS: usize = 5;

/// One candidate loan in a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub loan: LoanInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonInput {
    pub options: Vec<LoanOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    pub label: String,
    pub analysis: LoanOutput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonOutput {
    pub analyses: Vec<LoanAnalysis>,
    pub best_option: String,
    pub best_index: usize,
    /// Interest saved by the best option versus the most expensive one.
    pub interest_advantage: Money,
    pub recommendation: String,
}

/// Analyse 2 to 5 loans side by side and pick the one with the lowest total
/// interest (first occurrence wins ties).
pub fn compare_loans(
    input: &LoanComparisonInput,
) -> FinPlanResult<ComputationOutput<LoanComparisonOutput>> {
    let start = Instant::now();

    let count = input.options.len();
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
        return Err(FinPlanError::InvalidInput {
            field: "options".into(),
            reason: format!("Compare {MIN_OPTIONS}-{MAX_OPTIONS} loans at a time (got {count})"),
        });
    }

    let mut warnings = Vec::new();
    let mut analyses = Vec::with_capacity(count);
    for (i, option) in input.options.iter().enumerate() {
        let label = option
            .label
            .clone()
            .unwrap_or_else(|| format!("Option {}", i + 1));
        let out = analyze_loan(&option.loan);
        if out.result.schedule.is_empty() {
            return Err(FinPlanError::InvalidInput {
                field: format!("options[{i}]"),
                reason: format!("{label} cannot be analysed: {}", out.warnings.join("; ")),
            });
        }
        warnings.extend(out.warnings.into_iter().map(|w| format!("{label}: {w}")));
        analyses.push(LoanAnalysis {
            label,
            analysis: out.result,
        });
    }

    let mut best_index = 0;
    let mut worst_index = 0;
    for (i, a) in analyses.iter().enumerate() {
        if a.analysis.total_interest < analyses[best_index].analysis.total_interest {
            best_index = i;
        }
        if a.analysis.total_interest > analyses[worst_index].analysis.total_interest {
            worst_index = i;
        }
    }

    let best = &analyses[best_index];
    let interest_advantage =
        analyses[worst_index].analysis.total_interest - best.analysis.total_interest;
    let recommendation = if interest_advantage > Decimal::ZERO {
        format!(
            "{} has the lowest total interest ({}), saving {} versus {}",
            best.label,
            best.analysis.total_interest,
            interest_advantage,
            analyses[worst_index].label
        )
    } else {
        "All options cost the same total interest".to_string()
    };
    tracing::debug!(options = count, best = %best.label, "loans compared");

    let output = LoanComparisonOutput {
        best_option: best.label.clone(),
        best_index,
        interest_advantage,
        recommendation,
        analyses,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Comparison (lowest total interest)",
        &serde_json::json!({ "options": count }),
        warnings,
        elapsed,
        output,
    ))
}
