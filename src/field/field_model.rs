use std::fmt;

use serde_json::Value as Json;

use crate::block::media::Media;
use crate::error::validation::ValidationError;
use crate::field::widget::Widget;
use crate::value::BlockValue;

/// Settings every scalar field shares.
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    pub name: String,
    pub required: bool,
    pub default: BlockValue,
    pub label: Option<String>,
    pub help_text: Option<String>,
}

impl FieldOptions {
    pub fn required(required: bool) -> Self {
        FieldOptions {
            required,
            ..Self::default()
        }
    }
}

/// A single form input: owns type conversion, normalisation and validation
/// for one scalar value. Field blocks delegate every pipeline stage to one of
/// these.
pub trait ScalarField: Send + Sync + fmt::Debug {
    fn options(&self) -> &FieldOptions;

    fn options_mut(&mut self) -> &mut FieldOptions;

    fn widget(&self) -> &dyn Widget;

    /// Raw widget value → domain value.
    fn to_domain(&self, raw: &BlockValue) -> Result<BlockValue, ValidationError>;

    /// Domain value → the raw shape the widget would have produced.
    fn to_display(&self, value: &BlockValue) -> BlockValue;

    /// Normalise an already converted value.
    fn clean(&self, value: BlockValue) -> Result<BlockValue, ValidationError> {
        Ok(value)
    }

    /// Required check plus the field's own format rules.
    fn validate(&self, value: &BlockValue) -> Vec<ValidationError>;

    fn name(&self) -> &str {
        &self.options().name
    }

    /// Only called while the owning block is being built.
    fn set_name(&mut self, name: &str) {
        self.options_mut().name = name.to_string();
    }

    fn required(&self) -> bool {
        self.options().required
    }

    fn default_value(&self) -> BlockValue {
        self.options().default.clone()
    }

    fn label(&self) -> String {
        self.options()
            .label
            .clone()
            .unwrap_or_else(|| humanize(self.name()))
    }

    fn media(&self) -> Media {
        self.widget().media()
    }
}

/// Whether a value counts as "not filled in" for the required check.
pub fn is_blank(value: &BlockValue) -> bool {
    match value {
        BlockValue::Empty => true,
        BlockValue::Scalar(Json::Null) => true,
        BlockValue::Scalar(Json::String(s)) => s.is_empty(),
        BlockValue::List(items) => items.is_empty(),
        _ => false,
    }
}

/// `first_name` → `First name`.
pub fn humanize(name: &str) -> String {
    let spaced = name.replace(['_', '-'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
