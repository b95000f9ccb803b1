//! Item usage report
//!
//! Attaches per-item consumption, expiry and on-order aggregates to each item
//! node and rounds the stock stats for display.

use serde_json::{Map, Value};

use crate::accessor::{get_array, get_f64, get_str, number};
use crate::arguments::{parse_arguments, ItemUsageArguments};
use crate::calculators::{round_stat, QuantityIndex};
use crate::error::ConvertResult;
use crate::filter::{FilterChain, Predicate};
use crate::pipeline::{nodes_at, replace_nodes, run_pipeline, ConvertContext, ReportConverter, ReportData};

const CODE: &str = "item-usage";

/// Aggregate array in the query result and the line field it feeds.
const AGGREGATES: [(&str, &str); 8] = [
    ("thisMonthConsumption", "monthConsumption"),
    ("lastMonthConsumption", "lastMonthConsumption"),
    ("twoMonthsAgoConsumption", "twoMonthsAgoConsumption"),
    ("expiringInSixMonths", "expiringInSixMonths"),
    ("expiringInTwelveMonths", "expiringInTwelveMonths"),
    ("stockOnOrder", "stockOnOrder"),
    ("AMCTwelve", "AMC12"),
    ("AMCTwentyFour", "AMC24"),
];

fn build_line(node: &Value, indexes: &[(&str, QuantityIndex)]) -> Value {
    let id = get_str(node, "id");

    let mut line: Map<String, Value> = node.as_object().cloned().unwrap_or_default();
    for (field, index) in indexes {
        let quantity = id.map_or(0.0, |id| index.quantity_for(id));
        line.insert(field.to_string(), number(quantity));
    }
    line.insert(
        "SOH".into(),
        number(round_stat(get_f64(node, "stats.stockOnHand"))),
    );
    line.insert(
        "MOS".into(),
        number(round_stat(get_f64(node, "stats.availableMonthsOfStockOnHand"))),
    );
    Value::Object(line)
}

fn filters(args: &ItemUsageArguments) -> FilterChain {
    FilterChain::new()
        .with(
            args.item_code_or_name
                .as_deref()
                .and_then(|needle| Predicate::text_search(&["code", "name"], needle)),
        )
        .with(
            args.master_list_id
                .as_deref()
                .map(|id| Predicate::membership("masterLists", id)),
        )
        .with((args.show_zero_quantity == Some(false)).then(|| Predicate::non_zero("SOH")))
}

/// `item-usage` converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemUsage;

impl ReportConverter for ItemUsage {
    fn code(&self) -> &'static str {
        CODE
    }

    fn convert(&self, input: &ReportData, ctx: &ConvertContext) -> ConvertResult<ReportData> {
        let args: ItemUsageArguments = parse_arguments(input.arguments.as_ref())?;

        let indexes: Vec<(&str, QuantityIndex)> = AGGREGATES
            .iter()
            .map(|(source, field)| (*field, QuantityIndex::from_rows(get_array(&input.data, source))))
            .collect();

        // Empty item nodes carry nothing to report
        let lines: Vec<Value> = nodes_at(&input.data, "items.nodes", CODE)
            .iter()
            .filter(|item| item.as_object().is_some_and(|fields| !fields.is_empty()))
            .map(|item| build_line(item, &indexes))
            .collect();

        let sort = args.sorting.resolve(&ctx.default_sort);
        let lines = run_pipeline(lines, &filters(&args), &sort, ctx.null_placement);

        Ok(ReportData {
            data: replace_nodes(&input.data, "items", lines),
            arguments: input.arguments.clone(),
        })
    }
}
