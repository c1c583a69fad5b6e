use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, headers};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_envelope(result, map),
            _ => print_fields(map),
        },
        Value::Array(rows) => print_rows(rows),
        _ => println!("{}", cell(value)),
    }
}

fn print_envelope(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_fields(result);

    if let Some(Value::Array(impacts)) = result.get("lump_sum_impacts") {
        if !impacts.is_empty() {
            println!("\nLump sum impacts:");
            print_rows(impacts);
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(columns) = headers(rows) else {
        if rows.is_empty() {
            println!("(empty)");
        }
        for row in rows {
            println!("{}", cell(row));
        }
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(String::as_str));
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                columns
                    .iter()
                    .map(|c| map.get(c.as_str()).map(cell).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}
