use std::fmt;

use serde_json::Value as Json;

use crate::block::media::Media;
use crate::error::validation::ValidationError;
use crate::value::{BlockValue, WireData};

/// Reads a field's raw value out of submitted wire data and writes it back.
pub trait Widget: Send + Sync + fmt::Debug {
    /// HTML input type used by renderers (`text`, `checkbox`, `select`, ...).
    fn input_type(&self) -> &'static str;

    /// Extract the raw value submitted under `key`.
    fn value_from_wire(
        &self,
        wire: &WireData,
        key: &str,
    ) -> Result<BlockValue, Vec<ValidationError>>;

    /// Whether nothing at all was submitted for `key`.
    fn value_omitted(&self, wire: &WireData, key: &str) -> bool {
        !wire.contains_key(key)
    }

    /// Strings a browser would submit for a display value.
    fn format_value(&self, value: &BlockValue) -> Vec<String>;

    /// Whether the current value is echoed back when re-rendering.
    fn render_value(&self) -> bool {
        true
    }

    fn media(&self) -> Media {
        Media::default()
    }

    /// Extra attributes a renderer needs for this widget.
    fn context_attrs(&self) -> Vec<(String, Json)> {
        Vec::new()
    }
}

fn scalar_to_string(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// Text-like inputs
// ============================================================================

/// Single-value input: text, email, number, date, url.
#[derive(Debug, Clone)]
pub struct TextInput {
    input_type: &'static str,
}

impl TextInput {
    pub fn new(input_type: &'static str) -> Self {
        TextInput { input_type }
    }

    pub fn text() -> Self {
        Self::new("text")
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::text()
    }
}

impl Widget for TextInput {
    fn input_type(&self) -> &'static str {
        self.input_type
    }

    fn value_from_wire(
        &self,
        wire: &WireData,
        key: &str,
    ) -> Result<BlockValue, Vec<ValidationError>> {
        Ok(wire.get(key).map(BlockValue::text).unwrap_or_default())
    }

    fn format_value(&self, value: &BlockValue) -> Vec<String> {
        // empty inputs still submit their key
        match value {
            BlockValue::Scalar(v) => vec![scalar_to_string(v)],
            _ => vec![String::new()],
        }
    }

    fn media(&self) -> Media {
        if self.input_type == "date" {
            Media::new().with_js("blocks/date-input.js")
        } else {
            Media::default()
        }
    }
}

/// Text input that never echoes its value back to the page.
#[derive(Debug, Clone, Default)]
pub struct PasswordInput;

impl Widget for PasswordInput {
    fn input_type(&self) -> &'static str {
        "password"
    }

    fn value_from_wire(
        &self,
        wire: &WireData,
        key: &str,
    ) -> Result<BlockValue, Vec<ValidationError>> {
        TextInput::new("password").value_from_wire(wire, key)
    }

    fn format_value(&self, value: &BlockValue) -> Vec<String> {
        TextInput::new("password").format_value(value)
    }

    fn render_value(&self) -> bool {
        false
    }
}

// ============================================================================
// Checkbox
// ============================================================================

/// An unchecked checkbox submits nothing, so its value is never "omitted":
/// absence means `false`.
#[derive(Debug, Clone, Default)]
pub struct CheckboxInput;

impl Widget for CheckboxInput {
    fn input_type(&self) -> &'static str {
        "checkbox"
    }

    fn value_from_wire(
        &self,
        wire: &WireData,
        key: &str,
    ) -> Result<BlockValue, Vec<ValidationError>> {
        let checked = match wire.get(key) {
            None => false,
            Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "" | "false" | "0" | "off"),
        };
        Ok(BlockValue::from(checked))
    }

    fn value_omitted(&self, _wire: &WireData, _key: &str) -> bool {
        false
    }

    fn format_value(&self, value: &BlockValue) -> Vec<String> {
        match value {
            BlockValue::Scalar(Json::Bool(true)) => vec!["on".to_string()],
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Select
// ============================================================================

/// Single-choice dropdown.
#[derive(Debug, Clone, Default)]
pub struct Select {
    pub choices: Vec<(String, String)>,
}

impl Select {
    pub fn new(choices: Vec<(String, String)>) -> Self {
        Select { choices }
    }
}

impl Widget for Select {
    fn input_type(&self) -> &'static str {
        "select"
    }

    fn value_from_wire(
        &self,
        wire: &WireData,
        key: &str,
    ) -> Result<BlockValue, Vec<ValidationError>> {
        Ok(wire.get(key).map(BlockValue::text).unwrap_or_default())
    }

    fn format_value(&self, value: &BlockValue) -> Vec<String> {
        match value {
            BlockValue::Scalar(v) => vec![scalar_to_string(v)],
            _ => vec![String::new()],
        }
    }

    fn context_attrs(&self) -> Vec<(String, Json)> {
        let choices = self
            .choices
            .iter()
            .map(|(value, label)| Json::from(vec![value.clone(), label.clone()]))
            .collect();
        vec![("choices".to_string(), Json::Array(choices))]
    }
}
