//! Expiring items report
//!
//! Projects, for every stock line, how many days remain until expiry, how much
//! is expected to be used in that time and how much stock is at risk.

use serde_json::{Map, Value};

use crate::accessor::{get_f64, get_str, number};
use crate::arguments::{parse_arguments, StockLineArguments};
use crate::calculators::{days_until_expired, expected_usage, round_half_up, stock_at_risk};
use crate::error::ConvertResult;
use crate::filter::{FilterChain, Predicate};
use crate::pipeline::{nodes_at, replace_nodes, run_pipeline, ConvertContext, ReportConverter, ReportData};

const CODE: &str = "expiring-items";

pub(super) fn stock_line_filters(args: &StockLineArguments) -> FilterChain {
    FilterChain::new()
        .with(
            args.item_code_or_name
                .as_deref()
                .and_then(|needle| Predicate::text_search(&["item.code", "item.name"], needle)),
        )
        .with(
            args.master_list_id
                .as_deref()
                .map(|id| Predicate::membership("item.masterLists", id)),
        )
        .with(args.location_id.as_deref().map(|id| Predicate::equals("location.id", id)))
        .with(
            (args.show_zero_quantity == Some(false))
                .then(|| Predicate::non_zero("totalNumberOfPacks")),
        )
}

fn build_line(node: &Value, ctx: &ConvertContext) -> Value {
    let mut line: Map<String, Value> = node.as_object().cloned().unwrap_or_default();

    let days = days_until_expired(get_str(node, "expiryDate"), ctx.now);
    let amc = get_f64(node, "item.stats.averageMonthlyConsumption");

    if let Some(usage) = expected_usage(days, amc) {
        line.insert("expectedUsage".into(), number(usage));
    }
    let at_risk = stock_at_risk(
        get_f64(node, "packSize"),
        get_f64(node, "totalNumberOfPacks"),
        amc,
        days,
    );
    if let Some(at_risk) = at_risk {
        line.insert("stockAtRisk".into(), number(at_risk));
    }
    if let Some(days) = days {
        line.insert("daysUntilExpired".into(), number(round_half_up(days)));
    }
    Value::Object(line)
}

/// `expiring-items` converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpiringItems;

impl ReportConverter for ExpiringItems {
    fn code(&self) -> &'static str {
        CODE
    }

    fn convert(&self, input: &ReportData, ctx: &ConvertContext) -> ConvertResult<ReportData> {
        let args: StockLineArguments = parse_arguments(input.arguments.as_ref())?;

        let lines: Vec<Value> = nodes_at(&input.data, "stockLines.nodes", CODE)
            .iter()
            .map(|node| build_line(node, ctx))
            .collect();

        let sort = args.sorting.resolve(&ctx.default_sort);
        let lines = run_pipeline(lines, &stock_line_filters(&args), &sort, ctx.null_placement);

        Ok(ReportData {
            data: replace_nodes(&input.data, "stockLines", lines),
            arguments: input.arguments.clone(),
        })
    }
}
