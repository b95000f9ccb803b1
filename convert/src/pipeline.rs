//! Report conversion contract and the shared filter-then-sort step

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::accessor::get_array;
use crate::error::ConvertResult;
use crate::filter::FilterChain;
use crate::sort::{sort_lines, NullPlacement, SortSpec};

/// What the report host passes in and expects back: the query result (or the
/// converted envelope data) plus the caller's arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub data: Value,
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl ReportData {
    pub fn new(data: Value, arguments: Option<Value>) -> Self {
        Self { data, arguments }
    }
}

/// Per-call inputs that are not part of the query result.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertContext {
    /// Reference time for expiry calculations.
    pub now: DateTime<Utc>,
    /// Ordering used when the arguments name no sort key or direction.
    pub default_sort: SortSpec,
    pub null_placement: NullPlacement,
}

impl ConvertContext {
    pub fn new(now: DateTime<Utc>, default_sort: SortSpec) -> Self {
        Self {
            now,
            default_sort,
            null_placement: NullPlacement::default(),
        }
    }

    pub fn with_null_placement(mut self, null_placement: NullPlacement) -> Self {
        self.null_placement = null_placement;
        self
    }
}

/// One report's conversion from query result to template envelope.
///
/// Implementations must not keep state between calls; a converter may be shared
/// across threads and invoked concurrently.
pub trait ReportConverter: Send + Sync {
    /// Registry key, e.g. `"inventory-adjustments"`.
    fn code(&self) -> &'static str;

    fn convert(&self, input: &ReportData, ctx: &ConvertContext) -> ConvertResult<ReportData>;
}

/// Filter `lines` with `filters`, then order them by `sort`.
pub fn run_pipeline(
    lines: Vec<Value>,
    filters: &FilterChain,
    sort: &SortSpec,
    nulls: NullPlacement,
) -> Vec<Value> {
    let total = lines.len();
    let kept = filters.apply(lines);
    tracing::debug!(
        total,
        kept = kept.len(),
        predicates = filters.len(),
        sort_key = %sort.key,
        "filtered report lines"
    );
    sort_lines(kept, sort, nulls)
}

/// Node array at `path`; a missing collection is logged and treated as empty.
pub(crate) fn nodes_at<'a>(data: &'a Value, path: &str, report: &str) -> &'a [Value] {
    let nodes = get_array(data, path);
    if nodes.is_empty() && crate::accessor::get(data, path).and_then(Value::as_array).is_none() {
        tracing::warn!(report, path, "query result has no node array, producing empty lines");
    }
    nodes
}

/// Copy of `data` whose `collection.nodes` is replaced by `nodes`; every other
/// field passes through untouched.
pub(crate) fn replace_nodes(data: &Value, collection: &str, nodes: Vec<Value>) -> Value {
    let mut out = Map::new();
    let mut connection = Map::new();

    if let Value::Object(fields) = data {
        for (key, value) in fields {
            if key != collection {
                out.insert(key.clone(), value.clone());
                continue;
            }
            if let Value::Object(inner) = value {
                for (inner_key, inner_value) in inner {
                    if inner_key != "nodes" {
                        connection.insert(inner_key.clone(), inner_value.clone());
                    }
                }
            }
        }
    }

    connection.insert("nodes".to_string(), Value::Array(nodes));
    out.insert(collection.to_string(), Value::Object(connection));
    Value::Object(out)
}
