use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinPlanError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "Insufficient purchase history: requested {requested} units but only {matched} could be matched ({unmatched} unmatched)"
    )]
    InsufficientHistory {
        requested: Decimal,
        matched: Decimal,
        unmatched: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),
}

impl FinPlanError {
    /// An input whose arithmetic leaves the `Decimal` range.
    pub(crate) fn out_of_range(field: &str) -> Self {
        FinPlanError::InvalidInput {
            field: field.into(),
            reason: "result exceeds the supported decimal range".into(),
        }
    }
}
