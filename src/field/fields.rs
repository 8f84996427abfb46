use chrono::NaiveDate;
use serde_json::{Number, Value as Json};

use crate::error::validation::ValidationError;
use crate::field::field_model::{FieldOptions, ScalarField, is_blank};
use crate::field::widget::{CheckboxInput, PasswordInput, Select, TextInput, Widget};
use crate::value::BlockValue;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw scalar as text, or `None` for values a text input cannot produce.
fn raw_text(raw: &BlockValue) -> Option<String> {
    match raw {
        BlockValue::Empty => Some(String::new()),
        BlockValue::Scalar(Json::Null) => Some(String::new()),
        BlockValue::Scalar(Json::String(s)) => Some(s.clone()),
        BlockValue::Scalar(Json::Number(n)) => Some(n.to_string()),
        BlockValue::Scalar(Json::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

fn required_error(options: &FieldOptions, value: &BlockValue) -> Option<ValidationError> {
    (options.required && is_blank(value)).then(ValidationError::required)
}

// ============================================================================
// CharField
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharKind {
    Text,
    Email,
    Password,
    Url,
}

/// Free text, with flavours for email addresses, passwords and URLs.
#[derive(Debug)]
pub struct CharField {
    pub options: FieldOptions,
    pub kind: CharKind,
    pub strip: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    widget: Box<dyn Widget>,
}

impl CharField {
    pub fn new(kind: CharKind) -> Self {
        let widget: Box<dyn Widget> = match kind {
            CharKind::Text => Box::new(TextInput::text()),
            CharKind::Email => Box::new(TextInput::new("email")),
            CharKind::Url => Box::new(TextInput::new("url")),
            CharKind::Password => Box::new(PasswordInput),
        };
        CharField {
            options: FieldOptions::default(),
            kind,
            // passwords are taken verbatim
            strip: kind != CharKind::Password,
            min_length: None,
            max_length: None,
            widget,
        }
    }

    pub fn text() -> Self {
        Self::new(CharKind::Text)
    }

    pub fn email() -> Self {
        Self::new(CharKind::Email)
    }

    pub fn password() -> Self {
        Self::new(CharKind::Password)
    }

    pub fn url() -> Self {
        Self::new(CharKind::Url)
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.options.default = BlockValue::text(value);
        self
    }
}

fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn is_valid_url(s: &str) -> bool {
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or("");
            !host.is_empty() && !rest.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

impl ScalarField for CharField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn widget(&self) -> &dyn Widget {
        self.widget.as_ref()
    }

    fn to_domain(&self, raw: &BlockValue) -> Result<BlockValue, ValidationError> {
        raw_text(raw)
            .map(BlockValue::text)
            .ok_or_else(|| ValidationError::invalid("Enter a valid value."))
    }

    fn to_display(&self, value: &BlockValue) -> BlockValue {
        value.clone()
    }

    fn clean(&self, value: BlockValue) -> Result<BlockValue, ValidationError> {
        let Some(text) = value.as_str() else {
            return Ok(value);
        };
        let mut text = if self.strip {
            text.trim().to_string()
        } else {
            text.to_string()
        };
        if self.kind == CharKind::Email {
            if let Some((local, domain)) = text.rsplit_once('@') {
                text = format!("{}@{}", local, domain.to_lowercase());
            }
        }
        Ok(BlockValue::text(text))
    }

    fn validate(&self, value: &BlockValue) -> Vec<ValidationError> {
        if let Some(err) = required_error(&self.options, value) {
            return vec![err];
        }
        let Some(text) = value.as_str().filter(|s| !s.is_empty()) else {
            return Vec::new();
        };

        let mut errors = Vec::new();
        let length = text.chars().count();
        if let Some(min) = self.min_length.filter(|min| length < *min) {
            errors.push(ValidationError::new(
                "min_length",
                format!(
                    "Ensure this value has at least {} characters (it has {}).",
                    min, length
                ),
            ));
        }
        if let Some(max) = self.max_length.filter(|max| length > *max) {
            errors.push(ValidationError::new(
                "max_length",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, length
                ),
            ));
        }
        match self.kind {
            CharKind::Email if !is_valid_email(text) => {
                errors.push(ValidationError::invalid("Enter a valid email address."));
            }
            CharKind::Url if !is_valid_url(text) => {
                errors.push(ValidationError::invalid("Enter a valid URL."));
            }
            _ => {}
        }
        errors
    }
}

// ============================================================================
// IntegerField
// ============================================================================

/// Whole numbers with optional bounds.
#[derive(Debug)]
pub struct IntegerField {
    pub options: FieldOptions,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    widget: TextInput,
}

impl IntegerField {
    pub fn new() -> Self {
        IntegerField {
            options: FieldOptions::default(),
            min_value: None,
            max_value: None,
            widget: TextInput::new("number"),
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }

    pub fn with_min_value(mut self, min: i64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn with_max_value(mut self, max: i64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn with_default(mut self, value: i64) -> Self {
        self.options.default = BlockValue::from(value);
        self
    }
}

impl Default for IntegerField {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarField for IntegerField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn widget(&self) -> &dyn Widget {
        &self.widget
    }

    fn to_domain(&self, raw: &BlockValue) -> Result<BlockValue, ValidationError> {
        if let BlockValue::Scalar(Json::Number(n)) = raw {
            if let Some(i) = n.as_i64() {
                return Ok(BlockValue::from(i));
            }
        }
        let text = raw_text(raw).unwrap_or_else(|| "?".to_string());
        let text = text.trim();
        if text.is_empty() {
            return Ok(BlockValue::Empty);
        }
        text.parse::<i64>()
            .map(BlockValue::from)
            .map_err(|_| ValidationError::invalid("Enter a whole number."))
    }

    fn to_display(&self, value: &BlockValue) -> BlockValue {
        match value {
            BlockValue::Scalar(Json::Number(n)) => BlockValue::text(n.to_string()),
            other => other.clone(),
        }
    }

    fn validate(&self, value: &BlockValue) -> Vec<ValidationError> {
        if let Some(err) = required_error(&self.options, value) {
            return vec![err];
        }
        let Some(n) = value.as_scalar().and_then(Json::as_i64) else {
            return Vec::new();
        };
        bounds_errors(n as f64, self.min_value.map(|m| m as f64), self.max_value.map(|m| m as f64))
    }
}

fn bounds_errors(n: f64, min: Option<f64>, max: Option<f64>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if let Some(min) = min.filter(|min| n < *min) {
        errors.push(ValidationError::new(
            "min_value",
            format!("Ensure this value is greater than or equal to {}.", min),
        ));
    }
    if let Some(max) = max.filter(|max| n > *max) {
        errors.push(ValidationError::new(
            "max_value",
            format!("Ensure this value is less than or equal to {}.", max),
        ));
    }
    errors
}

// ============================================================================
// DecimalField
// ============================================================================

/// Floating point numbers.
#[derive(Debug)]
pub struct DecimalField {
    pub options: FieldOptions,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    widget: TextInput,
}

impl DecimalField {
    pub fn new() -> Self {
        DecimalField {
            options: FieldOptions::default(),
            min_value: None,
            max_value: None,
            widget: TextInput::new("number"),
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }

    pub fn with_min_value(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn with_max_value(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }
}

impl Default for DecimalField {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarField for DecimalField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn widget(&self) -> &dyn Widget {
        &self.widget
    }

    fn to_domain(&self, raw: &BlockValue) -> Result<BlockValue, ValidationError> {
        let invalid = || ValidationError::invalid("Enter a number.");
        if let BlockValue::Scalar(Json::Number(_)) = raw {
            return Ok(raw.clone());
        }
        let text = raw_text(raw).ok_or_else(invalid)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(BlockValue::Empty);
        }
        let n: f64 = text.parse().map_err(|_| invalid())?;
        Number::from_f64(n)
            .map(|n| BlockValue::Scalar(Json::Number(n)))
            .ok_or_else(invalid)
    }

    fn to_display(&self, value: &BlockValue) -> BlockValue {
        match value {
            BlockValue::Scalar(Json::Number(n)) => BlockValue::text(n.to_string()),
            other => other.clone(),
        }
    }

    fn validate(&self, value: &BlockValue) -> Vec<ValidationError> {
        if let Some(err) = required_error(&self.options, value) {
            return vec![err];
        }
        match value.as_scalar().and_then(Json::as_f64) {
            Some(n) => bounds_errors(n, self.min_value, self.max_value),
            None => Vec::new(),
        }
    }
}

// ============================================================================
// BooleanField
// ============================================================================

/// A checkbox. When required, it must be ticked.
#[derive(Debug, Default)]
pub struct BooleanField {
    pub options: FieldOptions,
    widget: CheckboxInput,
}

impl BooleanField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }

    pub fn with_default(mut self, value: bool) -> Self {
        self.options.default = BlockValue::from(value);
        self
    }
}

impl ScalarField for BooleanField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn widget(&self) -> &dyn Widget {
        &self.widget
    }

    fn to_domain(&self, raw: &BlockValue) -> Result<BlockValue, ValidationError> {
        let checked = match raw {
            BlockValue::Scalar(Json::Bool(b)) => *b,
            BlockValue::Scalar(Json::String(s)) => {
                !matches!(s.to_ascii_lowercase().as_str(), "" | "false" | "0" | "off")
            }
            BlockValue::Empty | BlockValue::Scalar(Json::Null) => false,
            _ => return Err(ValidationError::invalid("Enter a valid boolean.")),
        };
        Ok(BlockValue::from(checked))
    }

    fn to_display(&self, value: &BlockValue) -> BlockValue {
        value.clone()
    }

    fn validate(&self, value: &BlockValue) -> Vec<ValidationError> {
        let checked = matches!(value, BlockValue::Scalar(Json::Bool(true)));
        if self.options.required && !checked {
            return vec![ValidationError::required()];
        }
        Vec::new()
    }

    fn default_value(&self) -> BlockValue {
        match &self.options.default {
            BlockValue::Empty => BlockValue::from(false),
            other => other.clone(),
        }
    }
}

// ============================================================================
// DateField
// ============================================================================

/// Calendar dates submitted and stored as `YYYY-MM-DD`.
#[derive(Debug)]
pub struct DateField {
    pub options: FieldOptions,
    widget: TextInput,
}

impl DateField {
    pub fn new() -> Self {
        DateField {
            options: FieldOptions::default(),
            widget: TextInput::new("date"),
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }
}

impl Default for DateField {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarField for DateField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn widget(&self) -> &dyn Widget {
        &self.widget
    }

    fn to_domain(&self, raw: &BlockValue) -> Result<BlockValue, ValidationError> {
        let invalid = || ValidationError::invalid("Enter a valid date.");
        let text = raw_text(raw).ok_or_else(invalid)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(BlockValue::Empty);
        }
        let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| invalid())?;
        Ok(BlockValue::text(date.format(DATE_FORMAT).to_string()))
    }

    fn to_display(&self, value: &BlockValue) -> BlockValue {
        value.clone()
    }

    fn validate(&self, value: &BlockValue) -> Vec<ValidationError> {
        required_error(&self.options, value).into_iter().collect()
    }
}

// ============================================================================
// ChoiceField
// ============================================================================

/// One value out of a closed set of `(value, label)` pairs.
#[derive(Debug)]
pub struct ChoiceField {
    pub options: FieldOptions,
    widget: Select,
}

impl ChoiceField {
    pub fn new<V, L>(choices: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        ChoiceField {
            options: FieldOptions::default(),
            widget: Select::new(
                choices
                    .into_iter()
                    .map(|(v, l)| (v.into(), l.into()))
                    .collect(),
            ),
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }

    pub fn choices(&self) -> &[(String, String)] {
        &self.widget.choices
    }
}

impl ScalarField for ChoiceField {
    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.options
    }

    fn widget(&self) -> &dyn Widget {
        &self.widget
    }

    fn to_domain(&self, raw: &BlockValue) -> Result<BlockValue, ValidationError> {
        raw_text(raw)
            .map(BlockValue::text)
            .ok_or_else(|| ValidationError::invalid("Enter a valid value."))
    }

    fn to_display(&self, value: &BlockValue) -> BlockValue {
        value.clone()
    }

    fn validate(&self, value: &BlockValue) -> Vec<ValidationError> {
        if let Some(err) = required_error(&self.options, value) {
            return vec![err];
        }
        match value.as_str().filter(|s| !s.is_empty()) {
            Some(v) if !self.choices().iter().any(|(choice, _)| choice == v) => {
                vec![ValidationError::new(
                    "invalid_choice",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        v
                    ),
                )]
            }
            _ => Vec::new(),
        }
    }
}
