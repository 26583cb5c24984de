use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Computed at full decimal precision, rounded to 2 dp on output.
pub type Money = Decimal;

/// Annual rates expressed as percentages (12 = 12%). Never as fractions.
pub type Percent = Decimal;

/// Per-period rates expressed as fractions (0.01 = 1% per period).
pub type Rate = Decimal;

/// Unit counts for securities (fractional units allowed)
pub type Quantity = Decimal;

/// A dated, signed cash flow: negative for money invested, positive for money received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub date: NaiveDate,
    pub amount: Money,
}

/// One labelled point of a chart series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: Money,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: Money) -> Self {
        ChartPoint {
            label: label.into(),
            value,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Sample a monthly series once a year (months 1, 13, 25, ...) and always
/// include the final entry.
pub fn annual_samples<T>(
    rows: &[T],
    label: impl Fn(&T) -> String,
    value: impl Fn(&T) -> Money,
) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = rows
        .iter()
        .step_by(12)
        .map(|row| ChartPoint::new(label(row), value(row)))
        .collect();
    if let Some(last) = rows.last() {
        points.push(ChartPoint::new(label(last), value(last)));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_annual_samples_includes_last_row() {
        let rows: Vec<u32> = (1..=30).collect();
        let points = annual_samples(&rows, |m| format!("Month {m}"), |m| Decimal::from(*m));
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Month 1", "Month 13", "Month 25", "Month 30"]);
        assert_eq!(points[3].value, dec!(30));
    }

    #[test]
    fn test_annual_samples_empty() {
        let rows: Vec<u32> = vec![];
        assert!(annual_samples(&rows, |m| m.to_string(), |_| Decimal::ZERO).is_empty());
    }
}
