//! Report conversion scenarios
//!
//! End-to-end conversions over realistic query results, covering the
//! inventory adjustments filters and the expiry projections.

use chrono::{DateTime, Duration, TimeZone, Utc};
use report_convert::calculators::{
    days_until_expired, expected_usage, stock_at_risk, sum_quantity_for_id,
};
use report_convert::reports::{ExpiringItems, InventoryAdjustments};
use report_convert::{
    all_converters, ConvertContext, ConvertError, NullPlacement, ReportConverter, ReportData,
    SortDirection, SortSpec,
};
use serde_json::{json, Value};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
}

fn adjustments_ctx() -> ConvertContext {
    ConvertContext::new(now(), SortSpec::new("item.name", SortDirection::Desc))
}

/// Two direct adjustments and one stocktake-generated reduction
fn adjustments_query() -> Value {
    json!({
        "store": {"id": "store-1", "code": "CEN", "storeName": "Central Medical Store"},
        "invoices": {"nodes": [
            {
                "id": "inv-add",
                "invoiceNumber": 11,
                "type": "INVENTORY_ADDITION",
                "verifiedDatetime": "2025-02-10T10:00:00",
                "lines": {"nodes": [
                    {"id": "l-1", "numberOfPacks": 20, "packSize": 1,
                     "item": {"id": "i-1", "code": "AMX500", "name": "Amoxicillin 500mg", "masterLists": [{"id": "essential"}]},
                     "location": {"id": "loc-cold", "code": "COLD"}, "stockLine": {"id": "sl-1"},
                     "reasonOption": {"id": "found", "reason": "Found"}},
                    {"id": "l-2", "numberOfPacks": 0, "packSize": 1,
                     "item": {"id": "i-2", "code": "PCM", "name": "Paracetamol"},
                     "location": {"id": "loc-dry", "code": "DRY"}, "stockLine": {"id": "sl-2"}}
                ]}
            },
            {
                "id": "inv-red",
                "invoiceNumber": 12,
                "type": "INVENTORY_REDUCTION",
                "verifiedDatetime": "2025-02-12T16:45:00",
                "lines": {"nodes": [
                    {"id": "l-3", "numberOfPacks": 30, "packSize": 10,
                     "item": {"id": "i-3", "code": "ORS", "name": "Oral Rehydration Salts", "masterLists": [{"id": "essential"}]},
                     "location": {"id": "loc-dry", "code": "DRY"}, "stockLine": {"id": "sl-3"}}
                ]}
            }
        ]},
        "stocktakes": {"nodes": [
            {"id": "st-1", "stocktakeNumber": 4, "inventoryReductionId": "inv-red",
             "lines": {"nodes": [
                 {"id": "stl-1", "stockLineId": "sl-3", "snapshotNumberOfPacks": 80, "countedNumberOfPacks": 50}
             ]}}
        ]}
    })
}

fn line_ids(output: &ReportData) -> Vec<&str> {
    output.data["lines"]
        .as_array()
        .map(|lines| lines.iter().filter_map(|l| l["id"].as_str()).collect())
        .unwrap_or_default()
}

fn convert_adjustments(arguments: Value) -> ReportData {
    InventoryAdjustments
        .convert(
            &ReportData::new(adjustments_query(), Some(arguments)),
            &adjustments_ctx(),
        )
        .unwrap()
}

// ============================================================================
// Inventory Adjustments
// ============================================================================

#[cfg(test)]
mod adjustment_tests {
    use super::*;

    #[test]
    fn test_no_arguments_returns_every_line_sorted_by_default() {
        let output = convert_adjustments(json!({}));
        // item.name descending
        assert_eq!(line_ids(&output), vec!["l-2", "l-3", "l-1"]);
        assert_eq!(output.data["store"]["code"], json!("CEN"));
    }

    #[test]
    fn test_stocktake_reduction_is_counted_minus_snapshot() {
        let output = convert_adjustments(json!({"adjustmentSource": "STOCKTAKE"}));
        assert_eq!(line_ids(&output), vec!["l-3"]);
        let line = &output.data["lines"][0];
        assert_eq!(line["adjustmentPacks"], json!(-30));
        assert_eq!(line["adjustmentType"], json!("NEGATIVE"));
        assert_eq!(line["stocktakeNumber"], json!(4));
    }

    #[test]
    fn test_filter_by_type_and_master_list() {
        let output = convert_adjustments(json!({"adjustmentType": "POSITIVE"}));
        assert_eq!(line_ids(&output), vec!["l-2", "l-1"]);

        let output = convert_adjustments(json!({"masterListId": "essential", "sort": "invoiceNumber", "dir": "asc"}));
        assert_eq!(line_ids(&output), vec!["l-1", "l-3"]);
    }

    #[test]
    fn test_hide_zero_quantity_and_location() {
        let output = convert_adjustments(json!({"showZeroQuantity": false}));
        assert_eq!(line_ids(&output), vec!["l-3", "l-1"]);

        let output = convert_adjustments(json!({"showZeroQuantity": true, "locationId": "loc-dry"}));
        assert_eq!(line_ids(&output), vec!["l-2", "l-3"]);
    }

    #[test]
    fn test_reason_and_search() {
        let output = convert_adjustments(json!({"reasonId": "found"}));
        assert_eq!(line_ids(&output), vec!["l-1"]);

        let output = convert_adjustments(json!({"itemCodeOrName": "SALTS"}));
        assert_eq!(line_ids(&output), vec!["l-3"]);
    }

    #[test]
    fn test_sort_by_verified_datetime() {
        let output = convert_adjustments(json!({"sort": "verifiedDatetime", "dir": "desc"}));
        assert_eq!(line_ids(&output), vec!["l-3", "l-1", "l-2"]);
    }

    #[test]
    fn test_invalid_arguments_are_typed_errors() {
        let result = InventoryAdjustments.convert(
            &ReportData::new(adjustments_query(), Some(json!({"adjustmentType": "SIDEWAYS"}))),
            &adjustments_ctx(),
        );
        assert!(matches!(result, Err(ConvertError::InvalidArguments { .. })));
    }

    #[test]
    fn test_null_placement_is_configurable() {
        let mut query = adjustments_query();
        query["invoices"]["nodes"][0]["lines"]["nodes"][1]["location"] = Value::Null;
        let input = ReportData::new(query, Some(json!({"sort": "location.code", "dir": "desc"})));

        let greatest = InventoryAdjustments.convert(&input, &adjustments_ctx()).unwrap();
        assert_eq!(line_ids(&greatest), vec!["l-2", "l-3", "l-1"]);

        let always_last = InventoryAdjustments
            .convert(&input, &adjustments_ctx().with_null_placement(NullPlacement::AlwaysLast))
            .unwrap();
        assert_eq!(line_ids(&always_last), vec!["l-3", "l-1", "l-2"]);
    }
}

// ============================================================================
// Calculator and Expiry Scenarios
// ============================================================================

#[cfg(test)]
mod expiry_tests {
    use super::*;

    #[test]
    fn test_twenty_five_days_scenario() {
        let expiry = (now() + Duration::days(25)).to_rfc3339();
        let days = days_until_expired(Some(&expiry), now());
        assert!((days.unwrap() - 25.0).abs() < 1e-9);
        assert_eq!(expected_usage(days, Some(30.0)), Some(25.0));
        assert_eq!(stock_at_risk(Some(10.0), Some(100.0), Some(30.0), days), Some(975.0));
    }

    #[test]
    fn test_sum_quantity_scenario() {
        let rows = vec![json!({"item_id": "101", "quantity": 200})];
        assert_eq!(sum_quantity_for_id(&rows, "101"), 200.0);
        assert_eq!(sum_quantity_for_id(&rows, "missing"), 0.0);
        assert_eq!(
            sum_quantity_for_id(&[json!({"item_id": "101", "quantity": -5})], "101"),
            0.0
        );
    }

    #[test]
    fn test_expiring_items_report_filters_by_location() {
        let expiry = (now() + Duration::days(25)).to_rfc3339();
        let input = ReportData::new(
            json!({"stockLines": {"nodes": [
                {"id": "a", "expiryDate": expiry, "packSize": 10, "totalNumberOfPacks": 100,
                 "location": {"id": "loc-1"},
                 "item": {"code": "A", "name": "Alpha", "stats": {"averageMonthlyConsumption": 30}}},
                {"id": "b", "expiryDate": "2025-01-01", "packSize": 1, "totalNumberOfPacks": 7,
                 "location": {"id": "loc-2"},
                 "item": {"code": "B", "name": "Beta", "stats": {}}}
            ]}}),
            Some(json!({"locationId": "loc-1"})),
        );
        let ctx = ConvertContext::new(now(), SortSpec::new("expiryDate", SortDirection::Asc));
        let output = ExpiringItems.convert(&input, &ctx).unwrap();
        let nodes = output.data["stockLines"]["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0]["stockAtRisk"], json!(975));
        assert_eq!(output.arguments, Some(json!({"locationId": "loc-1"})));
    }
}

// ============================================================================
// Degraded Input
// ============================================================================

#[cfg(test)]
mod degraded_input_tests {
    use super::*;

    #[test]
    fn test_every_report_tolerates_missing_collections() {
        let ctx = ConvertContext::new(now(), SortSpec::new("id", SortDirection::Asc));
        for converter in all_converters() {
            for data in [json!({}), Value::Null, json!([1, 2, 3]), json!({"items": "nope"})] {
                let output = converter.convert(&ReportData::new(data, None), &ctx);
                assert!(output.is_ok(), "{} failed on degraded input", converter.code());
            }
        }
    }
}
