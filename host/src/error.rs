//! Error handling for the report host
//!
//! Every failure maps to an [`ErrorDetail`] that a template can render in place
//! of the report body.

use report_convert::ConvertError;
use serde::Serialize;
use thiserror::Error;

/// Host error types
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Unknown report: {0}")]
    UnknownReport(String),

    #[error("No default sort configured for report: {0}")]
    MissingSortDefaults(String),

    #[error("Invalid report input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}

pub type HostResult<T> = Result<T, HostError>;

/// Serializable error payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl HostError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            HostError::UnknownReport(_) => "UNKNOWN_REPORT",
            HostError::MissingSortDefaults(_) => "MISSING_SORT_DEFAULTS",
            HostError::InvalidInput(_) => "INVALID_INPUT",
            HostError::Convert(ConvertError::InvalidArguments { .. }) => "INVALID_ARGUMENTS",
            HostError::Export(_) => "EXPORT_ERROR",
            HostError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        let field = match self {
            HostError::Convert(ConvertError::InvalidArguments { field, .. }) => field.clone(),
            _ => None,
        };

        ErrorDetail {
            code: self.code().to_string(),
            message: self.to_string(),
            field,
        }
    }
}
