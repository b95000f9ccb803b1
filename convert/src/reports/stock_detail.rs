//! Stock detail report

use serde_json::{Map, Value};

use crate::accessor::{get_str, number};
use crate::arguments::{parse_arguments, StockLineArguments};
use crate::calculators::{days_until_expired, round_half_up};
use crate::error::ConvertResult;
use crate::pipeline::{nodes_at, replace_nodes, run_pipeline, ConvertContext, ReportConverter, ReportData};

use super::expiring_items::stock_line_filters;

const CODE: &str = "stock-detail";

fn build_line(node: &Value, ctx: &ConvertContext) -> Value {
    let mut line: Map<String, Value> = node.as_object().cloned().unwrap_or_default();
    if let Some(days) = days_until_expired(get_str(node, "expiryDate"), ctx.now) {
        line.insert("daysUntilExpired".into(), number(round_half_up(days)));
    }
    Value::Object(line)
}

/// `stock-detail` converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockDetail;

impl ReportConverter for StockDetail {
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
