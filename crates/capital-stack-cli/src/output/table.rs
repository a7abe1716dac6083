use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalars (and nested objects, flattened to dotted keys) go into a
/// Field/Value table. Every array of objects in the result gets its own
/// table underneath, titled with its key.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_object(res_map),
        Value::Array(arr) => print_array_table(arr),
        other => println!("{}", format_value(other)),
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

fn print_object(map: &Map<String, Value>) {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut tables: Vec<(&str, &[Value])> = Vec::new();

    for (key, val) in map {
        match val {
            Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {
                tables.push((key.as_str(), arr.as_slice()));
            }
            Value::Object(inner) => flatten_into(key, inner, &mut fields),
            _ => fields.push((key.clone(), format_value(val))),
        }
    }

    if !fields.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (k, v) in &fields {
            builder.push_record([k.as_str(), v.as_str()]);
        }
        println!("{}", Table::from(builder));
    }

    for (key, rows) in tables {
        println!("\n{}:", key);
        print_array_table(rows);
    }
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let name = format!("{prefix}.{key}");
        match val {
            Value::Object(inner) => flatten_into(&name, inner, out),
            _ => out.push((name, format_value(val))),
        }
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for map in arr.iter().filter_map(Value::as_object) {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) if arr.iter().any(|v| v.is_object() || v.is_array()) => {
            format!("[{} items]", arr.len())
        }
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_flatten_to_dotted_keys() {
        let map = json!({"composition": {"debt": "1", "equity": "2"}, "total": "3"});
        let mut out = Vec::new();
        flatten_into("composition", map["composition"].as_object().unwrap(), &mut out);
        assert_eq!(
            out,
            vec![
                ("composition.debt".to_string(), "1".to_string()),
                ("composition.equity".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn arrays_of_rows_are_summarized_inline() {
        assert_eq!(format_value(&json!([{"a": 1}, {"a": 2}])), "[2 items]");
        assert_eq!(format_value(&json!(["speed", "proven"])), "speed, proven");
        assert_eq!(format_value(&Value::Null), "-");
    }
}
