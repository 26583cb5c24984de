pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Print a command result in the chosen format. The csv and minimal formats
/// have no room for engine warnings, so those go to stderr.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value, false),
        OutputFormat::Compact => json::print_json(value, true),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
    if matches!(format, OutputFormat::Csv | OutputFormat::Minimal) {
        for warning in envelope_warnings(value) {
            eprintln!("warning: {warning}");
        }
    }
}

/// Warnings of a `ComputationOutput` envelope; empty for any other value.
fn envelope_warnings(value: &Value) -> Vec<&str> {
    value
        .get("warnings")
        .and_then(Value::as_array)
        .map(|warnings| warnings.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
