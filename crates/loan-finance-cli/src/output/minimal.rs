use serde_json::Value;

use super::format_scalar;

/// Fields worth printing on their own, most important first.
const PRIORITY_KEYS: [&str; 5] = [
    "effective_annual_rate_percent",
    "annual_rate_percent",
    "effective_rate_spread_percent",
    "periodic_payment",
    "total_cost",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

/// Pick the headline value out of an output envelope, falling back to the
/// first field of the result object.
fn minimal_answer(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_scalar(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }

    format_scalar(result_obj)
}
