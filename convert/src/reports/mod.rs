//! Report converters, one per standard report

mod expiring_items;
mod inventory_adjustments;
mod item_usage;
mod stock_detail;

pub use expiring_items::ExpiringItems;
pub use inventory_adjustments::{adjustment_packs, InventoryAdjustments, InvoiceKind};
pub use item_usage::ItemUsage;
pub use stock_detail::StockDetail;

use crate::pipeline::ReportConverter;
use crate::sort::{SortDirection, SortSpec};

/// Code and default ordering of every built-in report. Hosts seed their
/// configuration from this table and may override it.
const DEFAULT_SORTS: [(&str, &str, SortDirection); 4] = [
    ("inventory-adjustments", "item.name", SortDirection::Desc),
    ("item-usage", "name", SortDirection::Asc),
    ("expiring-items", "expiryDate", SortDirection::Asc),
    ("stock-detail", "item.name", SortDirection::Asc),
];

/// Default ordering of the built-in report registered under `code`.
pub fn default_sort(code: &str) -> Option<SortSpec> {
    DEFAULT_SORTS
        .iter()
        .find(|(report, _, _)| *report == code)
        .map(|(_, key, direction)| SortSpec::new(*key, *direction))
}

/// Every converter this crate ships, for registering with a report host.
pub fn all_converters() -> Vec<Box<dyn ReportConverter>> {
    vec![
        Box::new(InventoryAdjustments),
        Box::new(ItemUsage),
        Box::new(ExpiringItems),
        Box::new(StockDetail),
    ]
}
