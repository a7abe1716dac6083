use serde_json::Value;

/// Result fields worth printing on their own, most specific first.
const PRIORITY_KEYS: [&str; 7] = [
    "monthly_payment",
    "total_monthly_debt_service",
    "top_match",
    "blended_rate",
    "score",
    "step",
    "total_allocated",
];

/// Print just the headline value from the output.
///
/// Looks for well-known result fields in order, then falls back to the
/// first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Ranked lists and catalogs: one line per entry
    if let Value::Array(items) = result_obj {
        return items
            .iter()
            .map(|item| {
                ["slug", "id", "name"]
                    .iter()
                    .find_map(|k| item.get(*k))
                    .map(format_minimal)
                    .unwrap_or_else(|| format_minimal(item))
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key).filter(|v| !v.is_null()) {
                return format_minimal(val);
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_headline_field() {
        let v = json!({"result": {"instrument_id": "sba-loan", "monthly_payment": "22710.03"}});
        assert_eq!(minimal_line(&v), "22710.03");
        let v = json!({"result": {"rows": [], "top_match": "Term Loan"}});
        assert_eq!(minimal_line(&v), "Term Loan");
    }

    #[test]
    fn lists_print_one_slug_per_line() {
        let v = json!([{"slug": "pure-grant"}, {"slug": "term-loan"}]);
        assert_eq!(minimal_line(&v), "pure-grant\nterm-loan");
    }
}
