use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

/// Print an output envelope as tables.
///
/// An optimization result gets a transfer table, a class table and a short
/// summary; anything else is listed field by field.
pub fn print_table(value: &Value) {
    let envelope = match value {
        Value::Object(map) => map,
        _ => {
            println!("{}", value);
            return;
        }
    };
    let result = envelope.get("result").and_then(Value::as_object);

    match result {
        Some(res) if res.contains_key("asset_transfers") => {
            if let Some(Value::Array(lines)) = res.get("asset_transfers") {
                println!("{}", transfer_table(lines));
            }
            if let Some(Value::Array(classes)) = res.get("class_rates") {
                println!("\n{}", class_table(classes));
            }
            println!(
                "\n{}",
                field_table(res, &["score", "raw_score", "iterations", "max_violation"])
            );
        }
        Some(res) => println!("{}", field_table(res, &[])),
        None => println!("{}", field_table(envelope, &[])),
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

fn transfer_table(lines: &[Value]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Asset", "Class", "Value", "Transfer", "New value", "Rate", "Target"]);
    for line in lines {
        builder.push_record([
            text(line, "asset_name"),
            text(line, "class_name"),
            text(line, "initial_value"),
            signed(line.get("transfer_value")),
            text(line, "new_value"),
            rate_change(line),
            percent(line.get("target_rate")),
        ]);
    }
    builder.build()
}

fn class_table(classes: &[Value]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Class", "Rate", "Target"]);
    for class in classes {
        builder.push_record([
            text(class, "class_name"),
            rate_change(class),
            percent(class.get("target_rate")),
        ]);
    }
    builder.build()
}

/// Two-column listing. With `only` non-empty, just those keys in that order.
fn field_table(map: &Map<String, Value>, only: &[&str]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    if only.is_empty() {
        for (key, val) in map {
            builder.push_record([key.clone(), format_value(val)]);
        }
    } else {
        for key in only {
            if let Some(val) = map.get(*key) {
                builder.push_record([key.to_string(), format_value(val)]);
            }
        }
    }
    builder.build()
}

fn text(record: &Value, key: &str) -> String {
    record.get(key).map(format_value).unwrap_or_default()
}

fn decimal(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn signed(value: Option<&Value>) -> String {
    match decimal(value) {
        Some(d) if d > Decimal::ZERO => format!("+{}", d.normalize()),
        Some(d) => d.normalize().to_string(),
        None => String::new(),
    }
}

fn percent(value: Option<&Value>) -> String {
    decimal(value)
        .map(|d| format!("{}%", (d * Decimal::ONE_HUNDRED).round_dp(2)))
        .unwrap_or_default()
}

/// `initial → new` as percentages.
fn rate_change(record: &Value) -> String {
    format!(
        "{} → {}",
        percent(record.get("initial_rate")),
        percent(record.get("new_rate"))
    )
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
