use serde_json::Value;
use std::io;

/// Row-level lists, in the order they are looked for. The first one present
/// becomes the CSV body.
const PRIMARY_LISTS: [&str; 8] = [
    "schedule",
    "monthly_breakdown",
    "yearly_breakdown",
    "accumulation_years",
    "projections",
    "batches",
    "positions",
    "analyses",
];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let body = map.get("result").unwrap_or(value);
            match body {
                Value::Object(result) => {
                    let primary = PRIMARY_LISTS
                        .iter()
                        .find_map(|key| match result.get(*key) {
                            Some(Value::Array(rows)) if !rows.is_empty() => Some(rows),
                            _ => None,
                        });
                    match primary {
                        Some(rows) => write_array_csv(&mut wtr, rows),
                        None => {
                            let _ = wtr.write_record(["field", "value"]);
                            for (key, val) in result {
                                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                            }
                        }
                    }
                }
                other => {
                    let _ = wtr.write_record([&format_csv_value(other)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
