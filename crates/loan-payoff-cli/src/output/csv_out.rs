use serde_json::{Map, Value};
use std::io;

use super::{cell, headers};

/// Write output as CSV to stdout.
///
/// Record lists (schedules, impacts, yearly totals) become one row per
/// record; a projection envelope becomes a two-column field/value sheet.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match value {
        Value::Array(rows) => write_rows(&mut wtr, rows),
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => write_fields(&mut wtr, result),
            _ => write_fields(&mut wtr, map),
        },
        _ => wtr.write_record([cell(value)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &cell(val)])?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(columns) = headers(rows) else {
        for row in rows {
            wtr.write_record([cell(row)])?;
        }
        return Ok(());
    };

    wtr.write_record(&columns)?;
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = columns
                .iter()
                .map(|c| map.get(c.as_str()).map(cell).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}
