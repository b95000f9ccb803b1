//! Report data conversion for the stock reporting platform
//!
//! Reshapes raw report query results into the envelopes report templates render:
//! nested key-path access, quantity and stat calculators, an id-keyed line joiner,
//! an argument-driven filter chain and a type-aware stable sorter, wired together
//! per report by a [`ReportConverter`].

pub mod accessor;
pub mod arguments;
pub mod calculators;
pub mod dates;
pub mod error;
pub mod filter;
pub mod join;
pub mod pipeline;
pub mod reports;
pub mod sort;

pub use error::{ConvertError, ConvertResult};
pub use filter::{FilterChain, Predicate};
pub use pipeline::{run_pipeline, ConvertContext, ReportConverter, ReportData};
pub use reports::all_converters;
pub use sort::{NullPlacement, SortDirection, SortSpec};
