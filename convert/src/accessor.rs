//! Nested value access over JSON records
//!
//! Filtering, sorting and export all resolve key paths through [`get`], so a path
//! such as `"item.code"` means the same thing everywhere.

use serde_json::{Number, Value};

/// Resolve a dot-separated `path` against `record`.
///
/// Returns `None` when a segment is missing, when an intermediate value is not an
/// object, or when the resolved value is JSON `null`. An empty path resolves to
/// the record itself.
pub fn get<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    if !path.is_empty() {
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
    }
    (!current.is_null()).then_some(current)
}

pub fn get_str<'a>(record: &'a Value, path: &str) -> Option<&'a str> {
    get(record, path).and_then(Value::as_str)
}

pub fn get_f64(record: &Value, path: &str) -> Option<f64> {
    get(record, path).and_then(Value::as_f64)
}

/// Array at `path`, or an empty slice when absent or not an array.
pub fn get_array<'a>(record: &'a Value, path: &str) -> &'a [Value] {
    get(record, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Value at `path` cloned for an output record, `null` when absent.
pub fn cloned(record: &Value, path: &str) -> Value {
    get(record, path).cloned().unwrap_or(Value::Null)
}

/// Render a computed quantity as JSON, keeping whole numbers integral.
pub fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

/// Same scalar identity regardless of whether an id arrived as a string or a number.
pub fn scalar_eq(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested_path() {
        let record = json!({"item": {"code": "AMX", "stats": {"averageMonthlyConsumption": 12}}});
        assert_eq!(get(&record, "item.code"), Some(&json!("AMX")));
        assert_eq!(
            get_f64(&record, "item.stats.averageMonthlyConsumption"),
            Some(12.0)
        );
    }

    #[test]
    fn test_get_missing_or_null_segments() {
        let record = json!({"item": null, "location": "shelf", "batch": null});
        assert_eq!(get(&record, "item.code"), None);
        assert_eq!(get(&record, "location.id"), None);
        assert_eq!(get(&record, "batch"), None);
        assert_eq!(get(&record, "nothing.here.at.all"), None);
    }

    #[test]
    fn test_get_empty_path_is_record() {
        let record = json!({"a": 1});
        assert_eq!(get(&record, ""), Some(&record));
    }

    #[test]
    fn test_get_array_degrades_to_empty() {
        let record = json!({"invoices": {"nodes": "oops"}});
        assert!(get_array(&record, "invoices.nodes").is_empty());
        assert!(get_array(&record, "stocktakes.nodes").is_empty());
    }

    #[test]
    fn test_number_keeps_integers_integral() {
        assert_eq!(number(50.0), json!(50));
        assert_eq!(number(-50.0), json!(-50));
        assert_eq!(number(2.5), json!(2.5));
        assert_eq!(number(f64::NAN), Value::Null);
    }

    #[test]
    fn test_scalar_eq() {
        assert!(scalar_eq(&json!("101"), "101"));
        assert!(scalar_eq(&json!(101), "101"));
        assert!(!scalar_eq(&json!({"id": "101"}), "101"));
    }
}
