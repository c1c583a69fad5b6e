use serde_json::Value;

use super::cell;

/// Fields that answer "what does this loan look like", most important first.
const PRIORITY_KEYS: [&str; 5] = [
    "total_interest_saved",
    "monthly_payment",
    "payoff_date",
    "periods_saved",
    "interest_saved",
];

/// Print just the key answer value from the output.
///
/// For a projection that is the interest saved; for a record list it is the
/// last record, which for a schedule is the payoff row.
pub fn print_minimal(value: &Value) {
    let target = match value {
        Value::Object(map) => map.get("result").unwrap_or(value),
        Value::Array(rows) => rows.last().unwrap_or(value),
        _ => value,
    };

    if let Value::Object(map) = target {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", cell(val));
                return;
            }
        }
        if let Some(val) = map.get("remaining_balance") {
            let date = map.get("date").map(cell).unwrap_or_default();
            println!("{} {}", date, cell(val));
            return;
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, cell(val));
            return;
        }
    }

    println!("{}", cell(target));
}
