//! Typed report arguments
//!
//! Every field is optional; an absent field disables the matching filter or
//! falls back to the report's default ordering.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::dates::parse_date_like;
use crate::error::{ConvertError, ConvertResult};
use crate::sort::{SortDirection, SortSpec};

/// Sort key path and direction shared by every report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortArguments {
    pub sort: Option<String>,
    pub dir: Option<SortDirection>,
}

impl SortArguments {
    pub fn resolve(&self, defaults: &SortSpec) -> SortSpec {
        defaults.resolve(self.sort.as_deref(), self.dir)
    }
}

/// Sign of an inventory adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentType {
    Positive,
    Negative,
}

impl AdjustmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            AdjustmentType::Positive => "POSITIVE",
            AdjustmentType::Negative => "NEGATIVE",
        }
    }
}

/// Where an inventory adjustment line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentSource {
    /// Produced by finalising a stocktake.
    Stocktake,
    /// Entered directly as an inventory adjustment.
    InventoryAdjustment,
}

impl AdjustmentSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AdjustmentSource::Stocktake => "STOCKTAKE",
            AdjustmentSource::InventoryAdjustment => "INVENTORY_ADJUSTMENT",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_adjustment_dates"))]
pub struct AdjustmentArguments {
    #[validate(length(max = 256))]
    pub item_code_or_name: Option<String>,
    pub master_list_id: Option<String>,
    pub location_id: Option<String>,
    pub reason_id: Option<String>,
    pub show_zero_quantity: Option<bool>,
    pub adjustment_type: Option<AdjustmentType>,
    pub adjustment_source: Option<AdjustmentSource>,
    pub after: Option<String>,
    pub before: Option<String>,
    #[serde(flatten)]
    pub sorting: SortArguments,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemUsageArguments {
    #[validate(length(max = 256))]
    pub item_code_or_name: Option<String>,
    pub master_list_id: Option<String>,
    pub show_zero_quantity: Option<bool>,
    #[serde(flatten)]
    pub sorting: SortArguments,
}

/// Arguments of the stock line reports (expiring items, stock detail).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StockLineArguments {
    #[validate(length(max = 256))]
    pub item_code_or_name: Option<String>,
    pub master_list_id: Option<String>,
    pub location_id: Option<String>,
    pub show_zero_quantity: Option<bool>,
    #[serde(flatten)]
    pub sorting: SortArguments,
}

fn date_range_error(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("date_range");
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_adjustment_dates(args: &AdjustmentArguments) -> Result<(), ValidationError> {
    let parse = |value: &Option<String>| match value.as_deref() {
        None => Ok(None),
        Some(raw) => parse_date_like(raw)
            .map(Some)
            .ok_or_else(|| date_range_error("after and before must be ISO dates")),
    };

    if let (Some(after), Some(before)) = (parse(&args.after)?, parse(&args.before)?) {
        if after > before {
            return Err(date_range_error("after must not be later than before"));
        }
    }
    Ok(())
}

/// Deserialize and validate a report's arguments; `None` or `null` yields defaults.
pub fn parse_arguments<T>(arguments: Option<&Value>) -> ConvertResult<T>
where
    T: DeserializeOwned + Default + Validate,
{
    let parsed = match arguments {
        None | Some(Value::Null) => T::default(),
        Some(value) => T::deserialize(value)
            .map_err(|e| ConvertError::invalid_arguments(e.to_string()))?,
    };
    parsed.validate()?;
    Ok(parsed)
}
