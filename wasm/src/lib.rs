//! WebAssembly bindings for report conversion
//!
//! Lets a browser or embedded JS host run the report converters directly:
//! - Report conversion (JSON in, JSON out)
//! - Expiry and stock-at-risk projections for previews

use chrono::{DateTime, Utc};
use report_convert::calculators;
use report_convert::reports::default_sort;
use report_convert::{all_converters, ConvertContext, ReportData};
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
fn current_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn current_time() -> DateTime<Utc> {
    Utc::now()
}

fn reference_time(now_iso: Option<String>) -> Result<DateTime<Utc>, String> {
    match now_iso {
        None => Ok(current_time()),
        Some(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("Invalid reference time {}: {}", text, e)),
    }
}

fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// Same context a report host builds from its default configuration
fn context_for(report_code: &str, now: DateTime<Utc>) -> Result<ConvertContext, String> {
    let default_sort =
        default_sort(report_code).ok_or_else(|| format!("No default sort for {}", report_code))?;
    Ok(ConvertContext::new(now, default_sort))
}

fn convert(report_code: &str, input_json: &str, now_iso: Option<String>) -> Result<String, String> {
    let converter = all_converters()
        .into_iter()
        .find(|c| c.code() == report_code)
        .ok_or_else(|| format!("Unknown report: {}", report_code))?;
    let ctx = context_for(report_code, reference_time(now_iso)?)?;

    let input: ReportData = serde_json::from_str(input_json)
        .map_err(|e| format!("Invalid report JSON: {}", e))?;

    let output = converter.convert(&input, &ctx).map_err(|e| e.to_string())?;
    serde_json::to_string(&output).map_err(|e| format!("Serialization error: {}", e))
}

/// Convert a serialized `{data, arguments}` report payload.
///
/// `now_iso` pins the reference time for expiry calculations (RFC 3339).
#[wasm_bindgen]
pub fn convert_data(
    report_code: &str,
    input_json: &str,
    now_iso: Option<String>,
) -> Result<String, JsValue> {
    convert(report_code, input_json, now_iso).map_err(|message| {
        warn(&message);
        JsValue::from_str(&message)
    })
}

/// Codes of the reports this module can convert, as a JSON array
#[wasm_bindgen]
pub fn list_reports() -> String {
    let mut codes: Vec<&str> = all_converters().iter().map(|c| c.code()).collect();
    codes.sort_unstable();
    serde_json::to_string(&codes).unwrap_or_else(|_| "[]".to_string())
}

/// Days from the reference time until `expiry_date`, negative once expired
#[wasm_bindgen]
pub fn days_until_expired(expiry_date: &str, now_iso: Option<String>) -> Result<Option<f64>, JsValue> {
    let now = reference_time(now_iso).map_err(|e| JsValue::from_str(&e))?;
    Ok(calculators::days_until_expired(Some(expiry_date), now))
}

#[wasm_bindgen]
pub fn stock_at_risk(
    pack_size: Option<f64>,
    total_packs: Option<f64>,
    average_monthly_consumption: Option<f64>,
    days_until_expired: Option<f64>,
) -> Option<f64> {
    calculators::stock_at_risk(
        pack_size,
        total_packs,
        average_monthly_consumption,
        days_until_expired,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_host::{Config, ReportService};
    use serde_json::{json, Value};
    use std::sync::Arc;

    const NOW: &str = "2025-03-01T00:00:00Z";

    #[test]
    fn test_list_reports() {
        assert_eq!(
            list_reports(),
            r#"["expiring-items","inventory-adjustments","item-usage","stock-detail"]"#
        );
    }

    #[test]
    fn test_context_matches_default_host_configuration() {
        let host = ReportService::new(Arc::new(Config::defaults().unwrap()));
        let now = reference_time(Some(NOW.into())).unwrap();

        for converter in all_converters() {
            let code = converter.code();
            assert_eq!(
                context_for(code, now).unwrap(),
                host.context_for(code, now).unwrap(),
                "{}",
                code
            );
        }
    }

    #[test]
    fn test_convert_expiring_items() {
        let input = json!({
            "data": {"stockLines": {"nodes": [
                {"id": "b", "expiryDate": "2025-04-30", "packSize": 1, "totalNumberOfPacks": 1000,
                 "item": {"name": "ORS", "stats": {"averageMonthlyConsumption": 30}}},
                {"id": "a", "expiryDate": "2025-03-31", "packSize": 1, "totalNumberOfPacks": 10,
                 "item": {"name": "Zinc"}}
            ]}},
            "arguments": null
        });

        let output = convert("expiring-items", &input.to_string(), Some(NOW.into())).unwrap();
        let output: Value = serde_json::from_str(&output).unwrap();
        let nodes = output["data"]["stockLines"]["nodes"].as_array().unwrap();

        assert_eq!(nodes[0]["id"], "a");
        assert_eq!(nodes[0]["daysUntilExpired"], json!(30));
        assert_eq!(nodes[1]["id"], "b");
        assert_eq!(nodes[1]["daysUntilExpired"], json!(60));
        assert_eq!(nodes[1]["stockAtRisk"], json!(940));
    }

    #[test]
    fn test_convert_errors() {
        assert_eq!(
            convert("unknown", "{}", None).unwrap_err(),
            "Unknown report: unknown"
        );
        assert!(convert("item-usage", "not json", None)
            .unwrap_err()
            .starts_with("Invalid report JSON"));
        assert!(convert("item-usage", r#"{"data": {}}"#, Some("yesterday".into()))
            .unwrap_err()
            .starts_with("Invalid reference time"));
        assert!(convert(
            "item-usage",
            r#"{"data": {}, "arguments": {"dir": "sideways"}}"#,
            None
        )
        .unwrap_err()
        .starts_with("Invalid report arguments"));
    }

    #[test]
    fn test_days_until_expired() {
        assert_eq!(
            days_until_expired("2025-03-11", Some(NOW.into())).unwrap(),
            Some(10.0)
        );
        assert_eq!(days_until_expired("soon", Some(NOW.into())).unwrap(), None);
    }

    #[test]
    fn test_stock_at_risk() {
        assert_eq!(stock_at_risk(Some(1.0), Some(1000.0), Some(30.0), Some(25.0)), Some(975.0));
        assert_eq!(stock_at_risk(Some(1.0), Some(10.0), None, Some(5.0)), None);
    }
}
