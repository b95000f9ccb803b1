//! Quantity and stat calculators
//!
//! Pure functions deriving report fields from raw query values. `None` means
//! "not enough data to say", which callers render by omitting the field.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::accessor::{get, get_f64};
use crate::dates::parse_date_like;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_MONTH: f64 = 30.0;

/// Id field on the flat consumption/stock aggregate rows.
pub const AGGREGATE_ID_FIELD: &str = "item_id";
pub const AGGREGATE_QUANTITY_FIELD: &str = "quantity";

/// Round half up to an integer (2.5 -> 3, -2.5 -> -2).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Fractional days from `now` until `expiry_date`; negative once expired.
pub fn days_until_expired(expiry_date: Option<&str>, now: DateTime<Utc>) -> Option<f64> {
    let expiry = parse_date_like(expiry_date?)?;
    Some((expiry - now).num_milliseconds() as f64 / MILLIS_PER_DAY)
}

/// A zero or missing average monthly consumption both mean "no consumption data".
fn consumption(average_monthly_consumption: Option<f64>) -> Option<f64> {
    average_monthly_consumption.filter(|amc| *amc > 0.0)
}

/// Units expected to be used before expiry.
pub fn expected_usage(
    days_until_expired: Option<f64>,
    average_monthly_consumption: Option<f64>,
) -> Option<f64> {
    let days = days_until_expired.filter(|days| *days >= 0.0)?;
    let amc = consumption(average_monthly_consumption)?;
    Some(round_half_up(days * amc / DAYS_PER_MONTH))
}

/// Units projected to still be on hand at expiry.
///
/// Expired stock is entirely at risk. Stock that has not expired yet and has no
/// consumption data yields `None` rather than a guessed number. Never negative.
pub fn stock_at_risk(
    pack_size: Option<f64>,
    total_number_of_packs: Option<f64>,
    average_monthly_consumption: Option<f64>,
    days_until_expired: Option<f64>,
) -> Option<f64> {
    let total_stock = pack_size? * total_number_of_packs?;
    let days = days_until_expired?;

    let at_risk = match consumption(average_monthly_consumption) {
        Some(amc) if days >= 0.0 => total_stock - amc * (days / DAYS_PER_MONTH),
        _ if days < 0.0 => total_stock,
        _ => return None,
    };
    Some(round_half_up(at_risk).max(0.0))
}

/// Round a stat to one decimal place; missing or non-finite input reports as 0.
pub fn round_stat(value: Option<f64>) -> f64 {
    value
        .and_then(|v| Decimal::try_from(v).ok())
        .map(|d| d.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

fn row_id(row: &Value) -> Option<String> {
    match get(row, AGGREGATE_ID_FIELD)? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Quantity for `id` across the aggregate rows, clamped at zero.
pub fn sum_quantity_for_id(rows: &[Value], id: &str) -> f64 {
    let total: f64 = rows
        .iter()
        .filter(|row| row_id(row).as_deref() == Some(id))
        .filter_map(|row| get_f64(row, AGGREGATE_QUANTITY_FIELD))
        .sum();
    total.max(0.0)
}

/// Id-keyed view of one aggregate array, built once per conversion so that
/// per-item lookups stay constant time.
#[derive(Debug, Default, Clone)]
pub struct QuantityIndex {
    totals: HashMap<String, f64>,
}

impl QuantityIndex {
    pub fn from_rows(rows: &[Value]) -> Self {
        let mut totals: HashMap<String, f64> = HashMap::new();
        for row in rows {
            let (Some(id), Some(quantity)) = (row_id(row), get_f64(row, AGGREGATE_QUANTITY_FIELD))
            else {
                continue;
            };
            *totals.entry(id).or_default() += quantity;
        }
        Self { totals }
    }

    /// Same result as [`sum_quantity_for_id`] over the rows the index was built from.
    pub fn quantity_for(&self, id: &str) -> f64 {
        self.totals.get(id).copied().unwrap_or(0.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_days_until_expired() {
        let expiry = (now() + Duration::days(25)).to_rfc3339();
        let days = days_until_expired(Some(&expiry), now()).unwrap();
        assert!((days - 25.0).abs() < 1e-9);

        let half_day = (now() + Duration::hours(12)).to_rfc3339();
        assert!((days_until_expired(Some(&half_day), now()).unwrap() - 0.5).abs() < 1e-9);

        assert_eq!(days_until_expired(None, now()), None);
        assert_eq!(days_until_expired(Some("soon"), now()), None);
    }

    #[test]
    fn test_days_until_expired_negative_when_expired() {
        let days = days_until_expired(Some("2024-12-22"), now()).unwrap();
        assert!((days + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_expected_usage() {
        assert_eq!(expected_usage(Some(25.0), Some(30.0)), Some(25.0));
        assert_eq!(expected_usage(Some(10.0), Some(4.0)), Some(1.0));
        assert_eq!(expected_usage(Some(-1.0), Some(30.0)), None);
        assert_eq!(expected_usage(Some(25.0), None), None);
        assert_eq!(expected_usage(Some(25.0), Some(0.0)), None);
        assert_eq!(expected_usage(None, Some(30.0)), None);
    }

    #[test]
    fn test_stock_at_risk_with_consumption() {
        let at_risk = stock_at_risk(Some(10.0), Some(100.0), Some(30.0), Some(25.0));
        assert_eq!(at_risk, Some(975.0));
    }

    #[test]
    fn test_stock_at_risk_expired_is_total_stock() {
        assert_eq!(
            stock_at_risk(Some(10.0), Some(100.0), Some(30.0), Some(-3.0)),
            Some(1000.0)
        );
        assert_eq!(
            stock_at_risk(Some(10.0), Some(100.0), None, Some(-3.0)),
            Some(1000.0)
        );
        assert_eq!(
            stock_at_risk(Some(10.0), Some(100.0), Some(0.0), Some(-0.5)),
            Some(1000.0)
        );
    }

    #[test]
    fn test_stock_at_risk_without_consumption_not_expired_is_none() {
        assert_eq!(stock_at_risk(Some(10.0), Some(100.0), None, Some(5.0)), None);
        assert_eq!(stock_at_risk(Some(10.0), Some(100.0), Some(0.0), Some(5.0)), None);
    }

    #[test]
    fn test_stock_at_risk_never_negative() {
        // Consumption outpaces stock well before expiry
        assert_eq!(
            stock_at_risk(Some(1.0), Some(10.0), Some(300.0), Some(60.0)),
            Some(0.0)
        );
    }

    #[test]
    fn test_stock_at_risk_missing_inputs() {
        assert_eq!(stock_at_risk(None, Some(100.0), Some(30.0), Some(25.0)), None);
        assert_eq!(stock_at_risk(Some(10.0), None, Some(30.0), Some(25.0)), None);
        assert_eq!(stock_at_risk(Some(10.0), Some(100.0), Some(30.0), None), None);
    }

    #[test]
    fn test_round_stat() {
        assert_eq!(round_stat(Some(3.14159)), 3.1);
        assert_eq!(round_stat(Some(2.25)), 2.3);
        assert_eq!(round_stat(Some(7.0)), 7.0);
        assert_eq!(round_stat(None), 0.0);
        assert_eq!(round_stat(Some(f64::NAN)), 0.0);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(24.4), 24.0);
    }

    #[test]
    fn test_sum_quantity_for_id() {
        let rows = vec![
            json!({"item_id": "101", "quantity": 200}),
            json!({"item_id": "102", "quantity": -15}),
            json!({"item_id": 103, "quantity": 4.5}),
        ];
        assert_eq!(sum_quantity_for_id(&rows, "101"), 200.0);
        assert_eq!(sum_quantity_for_id(&rows, "missing"), 0.0);
        assert_eq!(sum_quantity_for_id(&rows, "102"), 0.0);
        assert_eq!(sum_quantity_for_id(&rows, "103"), 4.5);
        assert_eq!(sum_quantity_for_id(&[], "101"), 0.0);
    }

    #[test]
    fn test_sum_quantity_for_id_sums_repeated_rows() {
        let rows = vec![
            json!({"item_id": "101", "quantity": 20}),
            json!({"item_id": "101", "quantity": 5}),
        ];
        assert_eq!(sum_quantity_for_id(&rows, "101"), 25.0);
    }

    #[test]
    fn test_quantity_index_matches_linear_lookup() {
        let rows = vec![
            json!({"item_id": "101", "quantity": 200}),
            json!({"item_id": "101", "quantity": -300}),
            json!({"item_id": "104", "quantity": 12}),
            json!({"quantity": 99}),
        ];
        let index = QuantityIndex::from_rows(&rows);
        for id in ["101", "104", "missing"] {
            assert_eq!(index.quantity_for(id), sum_quantity_for_id(&rows, id));
        }
    }
}
