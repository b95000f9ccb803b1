//! Generic key-path sorting with type-aware comparison
//!
//! Keys are resolved once per line through the nested value accessor and
//! compared as numbers, as timestamps when both sides are date-like strings, or
//! as case-folded text. Keys of different kinds compare equal. Lines are ordered
//! with a stable merge sort, so ties (including mixed-kind ties) keep their input
//! order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::accessor::get;
use crate::dates::parse_date_like;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Where lines without a sort key end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPlacement {
    /// A missing key ranks above every value: last when ascending, first when
    /// descending. Descending is the exact reverse of ascending.
    #[default]
    Greatest,
    /// Missing keys always go last, whatever the direction.
    AlwaysLast,
}

impl NullPlacement {
    pub fn as_str(self) -> &'static str {
        match self {
            NullPlacement::Greatest => "greatest",
            NullPlacement::AlwaysLast => "always_last",
        }
    }
}

/// Key path and direction for one report's ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    /// Override the defaults with whatever the caller supplied.
    pub fn resolve(&self, key: Option<&str>, direction: Option<SortDirection>) -> SortSpec {
        let key = key.map(str::trim).filter(|k| !k.is_empty()).unwrap_or(self.key.as_str());
        SortSpec::new(key, direction.unwrap_or(self.direction))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Missing,
    Number(f64),
    Text {
        folded: String,
        raw: String,
        date: Option<DateTime<Utc>>,
    },
    Other,
}

impl SortKey {
    fn of(value: Option<&Value>) -> Self {
        match value {
            None => SortKey::Missing,
            Some(Value::Number(n)) => n.as_f64().map_or(SortKey::Other, SortKey::Number),
            Some(Value::String(s)) => SortKey::Text {
                folded: s.to_lowercase(),
                raw: s.clone(),
                date: parse_date_like(s),
            },
            Some(_) => SortKey::Other,
        }
    }
}

fn compare_present(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (
            SortKey::Text {
                folded: fa,
                raw: ra,
                date: da,
            },
            SortKey::Text {
                folded: fb,
                raw: rb,
                date: db,
            },
        ) => match (da, db) {
            (Some(da), Some(db)) => da.cmp(db),
            _ => fa.cmp(fb).then_with(|| ra.cmp(rb)),
        },
        _ => Ordering::Equal,
    }
}

fn compare_keys(a: &SortKey, b: &SortKey, direction: SortDirection, nulls: NullPlacement) -> Ordering {
    let missing_vs_value = match nulls {
        NullPlacement::Greatest => direction.apply(Ordering::Greater),
        NullPlacement::AlwaysLast => Ordering::Greater,
    };
    match (a, b) {
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (SortKey::Missing, _) => missing_vs_value,
        (_, SortKey::Missing) => missing_vs_value.reverse(),
        (a, b) => direction.apply(compare_present(a, b)),
    }
}

/// Compare two resolved values the way [`sort_lines`] does.
pub fn compare_values(
    a: Option<&Value>,
    b: Option<&Value>,
    direction: SortDirection,
    nulls: NullPlacement,
) -> Ordering {
    compare_keys(&SortKey::of(a), &SortKey::of(b), direction, nulls)
}

/// Stable top-down merge sort. Takes the left element on ties and never relies
/// on the comparator being transitive.
fn merge_sort<T, F>(mut items: Vec<T>, compare: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let next = if compare(r, l) == Ordering::Less {
            right.next()
        } else {
            left.next()
        };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

/// Order `lines` by the value at `spec.key`.
pub fn sort_lines(lines: Vec<Value>, spec: &SortSpec, nulls: NullPlacement) -> Vec<Value> {
    let keyed: Vec<(SortKey, Value)> = lines
        .into_iter()
        .map(|line| (SortKey::of(get(&line, &spec.key)), line))
        .collect();

    merge_sort(keyed, &|a: &(SortKey, Value), b: &(SortKey, Value)| {
        compare_keys(&a.0, &b.0, spec.direction, nulls)
    })
    .into_iter()
    .map(|(_, line)| line)
    .collect()
}
