//! Inventory adjustments report
//!
//! Joins inventory addition/reduction invoice lines with the stocktake lines
//! that produced them, derives the signed adjustment for each line and applies
//! the adjustment filters.

use serde_json::{json, Map, Value};

use crate::accessor::{cloned, get, get_f64, get_str, number};
use crate::arguments::{parse_arguments, AdjustmentArguments, AdjustmentSource, AdjustmentType};
use crate::error::ConvertResult;
use crate::filter::{FilterChain, Predicate};
use crate::join::{join, JoinKeys, JoinedLine};
use crate::pipeline::{nodes_at, run_pipeline, ConvertContext, ReportConverter, ReportData};

const CODE: &str = "inventory-adjustments";

const JOIN_KEYS: JoinKeys = JoinKeys {
    id: "id",
    primary_lines: "lines.nodes",
    secondary_links: &["inventoryAdditionId", "inventoryReductionId"],
    secondary_lines: "lines.nodes",
    primary_shared_key: "stockLine.id",
    secondary_shared_key: "stockLineId",
};

const REASON_PATHS: [&str; 2] = ["reasonOption", "inventoryAdjustmentReason"];

/// Invoice type discriminator of an inventory adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceKind {
    Addition,
    Reduction,
}

impl InvoiceKind {
    pub fn from_node_type(node_type: &str) -> Option<Self> {
        match node_type {
            "INVENTORY_ADDITION" | "InventoryAddition" => Some(InvoiceKind::Addition),
            "INVENTORY_REDUCTION" | "InventoryReduction" => Some(InvoiceKind::Reduction),
            _ => None,
        }
    }

    fn sign(self) -> f64 {
        match self {
            InvoiceKind::Addition => 1.0,
            InvoiceKind::Reduction => -1.0,
        }
    }
}

/// Signed pack change for one joined line.
///
/// Stocktake lines report `counted - snapshot`; anything else, including a
/// stocktake line missing either count, reports the invoice line's packs,
/// negated for reductions.
pub fn adjustment_packs(joined: &JoinedLine<'_>, kind: Option<InvoiceKind>) -> f64 {
    let counted_change = joined.secondary.and_then(|matched| {
        let counted = get_f64(matched.line, "countedNumberOfPacks")?;
        let snapshot = get_f64(matched.line, "snapshotNumberOfPacks")?;
        Some(counted - snapshot)
    });

    counted_change.unwrap_or_else(|| {
        let packs = get_f64(joined.line, "numberOfPacks").unwrap_or(0.0);
        packs * kind.map_or(1.0, InvoiceKind::sign)
    })
}

fn adjustment_type(kind: Option<InvoiceKind>, packs: f64) -> AdjustmentType {
    match kind {
        Some(InvoiceKind::Addition) => AdjustmentType::Positive,
        Some(InvoiceKind::Reduction) => AdjustmentType::Negative,
        None if packs < 0.0 => AdjustmentType::Negative,
        None => AdjustmentType::Positive,
    }
}

fn build_line(joined: &JoinedLine<'_>) -> Value {
    let kind = get_str(joined.parent, "type").and_then(InvoiceKind::from_node_type);
    let packs = adjustment_packs(joined, kind);
    let stocktake_line = joined.secondary.map(|m| m.line);

    // Stocktake lines are zero only when the count changed nothing
    let effective_packs = if joined.is_from_secondary() {
        Some(packs)
    } else {
        get_f64(joined.line, "numberOfPacks")
    };
    let reason = REASON_PATHS
        .iter()
        .find_map(|path| get(joined.line, path))
        .cloned()
        .unwrap_or(Value::Null);
    let source = if joined.is_from_secondary() {
        AdjustmentSource::Stocktake
    } else {
        AdjustmentSource::InventoryAdjustment
    };

    let mut line = Map::new();
    line.insert("id".into(), cloned(joined.line, "id"));
    line.insert("invoiceId".into(), cloned(joined.parent, "id"));
    line.insert("invoiceNumber".into(), cloned(joined.parent, "invoiceNumber"));
    line.insert("invoiceType".into(), cloned(joined.parent, "type"));
    line.insert("verifiedDatetime".into(), cloned(joined.parent, "verifiedDatetime"));
    line.insert("item".into(), cloned(joined.line, "item"));
    line.insert("location".into(), cloned(joined.line, "location"));
    line.insert("reason".into(), reason);
    line.insert("batch".into(), cloned(joined.line, "batch"));
    line.insert("expiryDate".into(), cloned(joined.line, "expiryDate"));
    line.insert("packSize".into(), cloned(joined.line, "packSize"));
    line.insert("numberOfPacks".into(), cloned(joined.line, "numberOfPacks"));
    line.insert("stockLineId".into(), cloned(joined.line, "stockLine.id"));
    line.insert(
        "stocktakeNumber".into(),
        joined
            .secondary
            .map_or(Value::Null, |m| cloned(m.record, "stocktakeNumber")),
    );
    line.insert(
        "snapshotNumberOfPacks".into(),
        stocktake_line.map_or(Value::Null, |l| cloned(l, "snapshotNumberOfPacks")),
    );
    line.insert(
        "countedNumberOfPacks".into(),
        stocktake_line.map_or(Value::Null, |l| cloned(l, "countedNumberOfPacks")),
    );
    line.insert("isFromStocktake".into(), Value::Bool(joined.is_from_secondary()));
    line.insert("adjustmentPacks".into(), number(packs));
    line.insert(
        "effectivePacks".into(),
        effective_packs.map_or(Value::Null, number),
    );
    line.insert(
        "adjustmentType".into(),
        Value::from(adjustment_type(kind, packs).as_str()),
    );
    line.insert("adjustmentSource".into(), Value::from(source.as_str()));
    Value::Object(line)
}

fn filters(args: &AdjustmentArguments) -> FilterChain {
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
        .with(args.reason_id.as_deref().map(|id| Predicate::equals("reason.id", id)))
        .with(
            (args.show_zero_quantity == Some(false)).then(|| Predicate::non_zero("effectivePacks")),
        )
        .with(
            args.adjustment_type
                .map(|t| Predicate::equals("adjustmentType", t.as_str())),
        )
        .with(
            args.adjustment_source
                .map(|s| Predicate::equals("adjustmentSource", s.as_str())),
        )
}

/// `inventory-adjustments` converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryAdjustments;

impl ReportConverter for InventoryAdjustments {
    fn code(&self) -> &'static str {
        CODE
    }

    fn convert(&self, input: &ReportData, ctx: &ConvertContext) -> ConvertResult<ReportData> {
        let args: AdjustmentArguments = parse_arguments(input.arguments.as_ref())?;

        let invoices = nodes_at(&input.data, "invoices.nodes", CODE);
        let stocktakes = nodes_at(&input.data, "stocktakes.nodes", CODE);
        let lines: Vec<Value> = join(invoices, stocktakes, &JOIN_KEYS)
            .iter()
            .map(build_line)
            .collect();

        let sort = args.sorting.resolve(&ctx.default_sort);
        let lines = run_pipeline(lines, &filters(&args), &sort, ctx.null_placement);

        let date = if args.after.is_some() || args.before.is_some() {
            json!({ "after": args.after, "before": args.before })
        } else {
            Value::Null
        };

        Ok(ReportData {
            data: json!({
                "date": date,
                "lines": lines,
                "store": cloned(&input.data, "store"),
            }),
            arguments: input.arguments.clone(),
        })
    }
}
