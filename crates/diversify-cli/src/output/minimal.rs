use serde_json::Value;

/// Print just the key answer from the output.
///
/// For an optimization that is one `name<TAB>transfer` line per asset.
/// Otherwise look for well-known result fields, then fall back to the first
/// field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Array(lines)) = result_obj.get("asset_transfers") {
        for line in lines {
            let name = line.get("asset_name").map(format_minimal).unwrap_or_default();
            let transfer = line
                .get("transfer_value")
                .map(format_minimal)
                .unwrap_or_default();
            println!("{}\t{}", name, transfer);
        }
        return;
    }

    let priority_keys = ["score", "valid"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
