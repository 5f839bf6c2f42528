//! Field-level change summaries for audit entries

use serde_json::Value;

/// Describe the top-level fields that differ between two serialized records
///
/// Returns `None` when nothing changed. Non-object values are compared whole.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes: Vec<String> = match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            let mut keys: Vec<&String> = old.keys().chain(new.keys()).collect();
            keys.sort();
            keys.dedup();

            keys.into_iter()
                .filter_map(|key| match (old.get(key), new.get(key)) {
                    (Some(a), Some(b)) if a == b => None,
                    (a, b) => Some(format!(
                        "{}: {} -> {}",
                        key,
                        a.map_or_else(|| "(none)".to_string(), short),
                        b.map_or_else(|| "(none)".to_string(), short)
                    )),
                })
                .collect()
        }
        _ if before == after => Vec::new(),
        _ => vec![format!("{} -> {}", short(before), short(after))],
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn short(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(37).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_field_only() {
        let before = json!({"username": "bob", "is_admin": false});
        let after = json!({"username": "bob", "is_admin": true});

        assert_eq!(
            generate_diff(&before, &after).as_deref(),
            Some("is_admin: false -> true")
        );
    }

    #[test]
    fn test_added_and_removed_fields() {
        let diff = generate_diff(&json!({"note": "x"}), &json!({"amount": 5})).unwrap();
        assert!(diff.contains("amount: (none) -> 5"));
        assert!(diff.contains("note: \"x\" -> (none)"));
    }

    #[test]
    fn test_no_changes() {
        let value = json!({"amount": 1000});
        assert!(generate_diff(&value, &value).is_none());
    }

    #[test]
    fn test_long_strings_truncated() {
        let diff = generate_diff(&json!({"note": "a".repeat(80)}), &json!({"note": ""})).unwrap();
        assert!(diff.contains("...\""));
    }
}
