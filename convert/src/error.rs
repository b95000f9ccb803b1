//! Error types for report conversion

use thiserror::Error;
use validator::ValidationErrors;

/// Failures a converter reports to its host instead of panicking mid-render.
///
/// Missing optional data and missing collections are never errors: they degrade
/// to nulls, zeros or empty line lists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Invalid report arguments: {message}")]
    InvalidArguments {
        field: Option<String>,
        message: String,
    },
}

pub type ConvertResult<T> = Result<T, ConvertError>;

impl ConvertError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        ConvertError::InvalidArguments {
            field: None,
            message: message.into(),
        }
    }
}

impl From<ValidationErrors> for ConvertError {
    fn from(errors: ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .find(|name| **name != "__all__")
            .map(|name| argument_name(name));

        ConvertError::InvalidArguments {
            field,
            message: errors.to_string(),
        }
    }
}

/// Argument name as the caller spelled it (`item_code_or_name` -> `itemCodeOrName`).
fn argument_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = !name.is_empty();
        } else if upper {
            name.extend(ch.to_uppercase());
            upper = false;
        } else {
            name.push(ch);
        }
    }
    name
}
