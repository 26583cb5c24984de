use serde_json::Value;

/// Envelope fields that vary between runs of the same calculation.
const RUN_SPECIFIC_FIELDS: [&str; 1] = ["metadata"];

/// Render a command result as JSON.
///
/// The pretty form is the full envelope. The compact form is a single line
/// without the run-specific `metadata` block, so two runs on the same input
/// print identical lines that can be diffed or piped into `jq`.
pub fn render_json(value: &Value, compact: bool) -> serde_json::Result<String> {
    if !compact {
        return serde_json::to_string_pretty(value);
    }
    match value {
        Value::Object(map) if map.contains_key("result") => {
            let mut stable = map.clone();
            for field in RUN_SPECIFIC_FIELDS {
                stable.remove(field);
            }
            serde_json::to_string(&stable)
        }
        _ => serde_json::to_string(value),
    }
}

pub fn print_json(value: &Value, compact: bool) {
    match render_json(value, compact) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
