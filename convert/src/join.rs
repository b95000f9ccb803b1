//! Left join of a primary collection's nested lines against a secondary collection
//!
//! The primary side (e.g. inventory adjustment invoices) carries nested line
//! arrays; the secondary side (e.g. stocktakes) links back to a primary record by
//! id and carries its own nested lines keyed by a shared foreign key (e.g. the
//! stock line id). Both lookup maps are built in a single pass over the
//! secondary collection, so the join is linear in the number of lines.

use std::collections::HashMap;

use serde_json::Value;

use crate::accessor::{get_array, get_str};

/// Key paths describing how two collections link up.
#[derive(Debug, Clone, Copy)]
pub struct JoinKeys {
    /// Id field on both primary and secondary records.
    pub id: &'static str,
    /// Nested line array on each primary record.
    pub primary_lines: &'static str,
    /// Fields on a secondary record naming the primary record it produced.
    pub secondary_links: &'static [&'static str],
    /// Nested line array on each secondary record.
    pub secondary_lines: &'static str,
    /// Shared key on a primary line.
    pub primary_shared_key: &'static str,
    /// Shared key on a secondary line.
    pub secondary_shared_key: &'static str,
}

/// Secondary record and line matched to a primary line.
#[derive(Debug, Clone, Copy)]
pub struct SecondaryMatch<'a> {
    pub record: &'a Value,
    pub line: &'a Value,
}

/// One primary line with its parent record and optional secondary match.
#[derive(Debug, Clone, Copy)]
pub struct JoinedLine<'a> {
    pub parent: &'a Value,
    pub line: &'a Value,
    pub secondary: Option<SecondaryMatch<'a>>,
}

impl JoinedLine<'_> {
    pub fn is_from_secondary(&self) -> bool {
        self.secondary.is_some()
    }
}

struct LookupMaps<'a> {
    by_link: HashMap<&'a str, &'a Value>,
    by_shared_key: HashMap<(&'a str, &'a str), &'a Value>,
}

impl<'a> LookupMaps<'a> {
    fn build(secondary: &'a [Value], keys: &JoinKeys) -> Self {
        let mut by_link = HashMap::new();
        let mut by_shared_key = HashMap::new();

        for record in secondary {
            let Some(record_id) = get_str(record, keys.id) else {
                continue;
            };
            for link in keys.secondary_links {
                if let Some(primary_id) = get_str(record, link) {
                    by_link.entry(primary_id).or_insert(record);
                }
            }
            for line in get_array(record, keys.secondary_lines) {
                if let Some(shared) = get_str(line, keys.secondary_shared_key) {
                    by_shared_key.entry((record_id, shared)).or_insert(line);
                }
            }
        }

        Self {
            by_link,
            by_shared_key,
        }
    }

    fn find(&self, parent: &'a Value, line: &'a Value, keys: &JoinKeys) -> Option<SecondaryMatch<'a>> {
        let record = *self.by_link.get(get_str(parent, keys.id)?)?;
        let record_id = get_str(record, keys.id)?;
        let shared = get_str(line, keys.primary_shared_key)?;
        let matched = *self.by_shared_key.get(&(record_id, shared))?;
        Some(SecondaryMatch {
            record,
            line: matched,
        })
    }
}

/// Flatten every primary record's lines and attach the matching secondary line.
///
/// Every primary line yields exactly one [`JoinedLine`], in input order; lines
/// without a match carry `secondary: None`.
pub fn join<'a>(primary: &'a [Value], secondary: &'a [Value], keys: &JoinKeys) -> Vec<JoinedLine<'a>> {
    let maps = LookupMaps::build(secondary, keys);

    let mut joined = Vec::new();
    for parent in primary {
        for line in get_array(parent, keys.primary_lines) {
            joined.push(JoinedLine {
                parent,
                line,
                secondary: maps.find(parent, line, keys),
            });
        }
    }

    tracing::debug!(
        primary_records = primary.len(),
        secondary_records = secondary.len(),
        lines = joined.len(),
        matched = joined.iter().filter(|j| j.is_from_secondary()).count(),
        "joined report lines"
    );
    joined
}
