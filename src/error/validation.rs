use std::fmt;

use serde::{Deserialize, Serialize};

/// A typed validation failure raised by a scalar field or a validator
/// callback.
///
/// `code` is a short machine-readable token (`required`, `invalid`,
/// `max_length`, ...). `field` is set when the error knows which record child
/// it belongs to; aggregation re-keys such errors by that name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            code: code.into(),
            message: message.into(),
            field: None,
        }
    }

    pub fn required() -> Self {
        Self::new("required", "This field is required.")
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new("invalid", message)
    }

    /// Attach the record child this error belongs to.
    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}
