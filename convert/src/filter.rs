//! Argument-driven filter chain
//!
//! Each report argument maps to at most one [`Predicate`]; an absent argument
//! simply contributes no predicate. A line is kept when every predicate in the
//! chain accepts it.

use serde_json::Value;

use crate::accessor::{get, get_f64, scalar_eq};

/// A single line test against one argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring match on any of the paths.
    TextSearch { paths: Vec<String>, needle: String },
    /// Collection at `path` contains `id` (as a plain value or an object's `id`).
    Membership { path: String, id: String },
    /// Scalar at `path` equals `value`.
    Equals { path: String, value: String },
    /// Rejects lines whose number at `path` is exactly zero.
    NonZero { path: String },
}

impl Predicate {
    /// Returns `None` for a blank needle so an empty search box filters nothing.
    pub fn text_search(paths: &[&str], needle: &str) -> Option<Self> {
        let needle = needle.trim();
        if needle.is_empty() {
            return None;
        }
        Some(Predicate::TextSearch {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            needle: needle.to_lowercase(),
        })
    }

    pub fn membership(path: &str, id: impl Into<String>) -> Self {
        Predicate::Membership {
            path: path.to_string(),
            id: id.into(),
        }
    }

    pub fn equals(path: &str, value: impl Into<String>) -> Self {
        Predicate::Equals {
            path: path.to_string(),
            value: value.into(),
        }
    }

    pub fn non_zero(path: &str) -> Self {
        Predicate::NonZero {
            path: path.to_string(),
        }
    }

    pub fn matches(&self, line: &Value) -> bool {
        match self {
            Predicate::TextSearch { paths, needle } => paths.iter().any(|path| {
                get(line, path)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(needle.as_str()))
            }),
            Predicate::Membership { path, id } => get(line, path)
                .and_then(Value::as_array)
                .is_some_and(|members| {
                    members.iter().any(|member| {
                        scalar_eq(member, id) || get(member, "id").is_some_and(|m| scalar_eq(m, id))
                    })
                }),
            Predicate::Equals { path, value } => {
                get(line, path).is_some_and(|found| scalar_eq(found, value))
            }
            Predicate::NonZero { path } => get_f64(line, path) != Some(0.0),
        }
    }

    fn cost(&self) -> u8 {
        match self {
            Predicate::NonZero { .. } => 0,
            Predicate::Equals { .. } => 1,
            Predicate::Membership { .. } => 2,
            Predicate::TextSearch { .. } => 3,
        }
    }
}

/// Logical AND over a set of predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    predicates: Vec<Predicate>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate if the corresponding argument was supplied.
    pub fn with(mut self, predicate: Option<Predicate>) -> Self {
        if let Some(predicate) = predicate {
            self.predicates.push(predicate);
            // Cheap checks first; AND is order independent
            self.predicates.sort_by_key(Predicate::cost);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn matches(&self, line: &Value) -> bool {
        self.predicates.iter().all(|p| p.matches(line))
    }

    pub fn apply(&self, lines: Vec<Value>) -> Vec<Value> {
        if self.is_empty() {
            return lines;
        }
        lines.into_iter().filter(|line| self.matches(line)).collect()
    }
}
