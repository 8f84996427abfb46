use std::fmt;

use serde_json::Value as Json;

use crate::block::block_model::{Block, Validator, run_validators};
use crate::block::media::Media;
use crate::error::{BlockErrors, DecodeFailure};
use crate::field::ScalarField;
use crate::presentation::{BindScope, BoundBlock, BoundKind, PresentationContext};
use crate::value::{BlockValue, WireData};

/// Leaf block wrapping exactly one scalar field. Every stage is a direct
/// pass-through to the field.
pub struct FieldBlock {
    name: String,
    field: Box<dyn ScalarField>,
    validators: Vec<Validator>,
}

impl fmt::Debug for FieldBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBlock")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

impl FieldBlock {
    pub fn new<F: ScalarField + 'static>(field: F) -> Self {
        Self::from_boxed(Box::new(field))
    }

    pub fn from_boxed(field: Box<dyn ScalarField>) -> Self {
        FieldBlock {
            name: field.name().to_string(),
            field,
            validators: Vec::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.set_name(name);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn field(&self) -> &dyn ScalarField {
        self.field.as_ref()
    }
}

impl Block for FieldBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.field.set_name(name);
    }

    fn decode_wire(&self, wire: &WireData, prefix: &str) -> Result<BlockValue, DecodeFailure> {
        self.field
            .widget()
            .value_from_wire(wire, prefix)
            .map_err(DecodeFailure::empty)
    }

    fn value_omitted(&self, wire: &WireData, prefix: &str) -> bool {
        self.field.widget().value_omitted(wire, prefix)
    }

    fn to_domain(&self, raw: BlockValue) -> Result<BlockValue, BlockErrors> {
        self.field.to_domain(&raw).map_err(BlockErrors::from)
    }

    fn clean(&self, value: BlockValue) -> Result<BlockValue, BlockErrors> {
        self.field.clean(value).map_err(BlockErrors::from)
    }

    fn to_display(&self, value: &BlockValue) -> BlockValue {
        self.field.to_display(value)
    }

    fn validate(&self, value: &BlockValue) -> Result<(), BlockErrors> {
        // block validators first, then the field's own rules, one list
        let mut errors = run_validators(&self.validators, value);
        errors.extend(self.field.validate(value));
        BlockErrors::from(errors).into_result(())
    }

    fn default_value(&self) -> BlockValue {
        self.field.default_value()
    }

    fn encode_wire(&self, display: &BlockValue, prefix: &str, wire: &mut WireData) {
        let values = self.field.widget().format_value(display);
        if !values.is_empty() {
            wire.insert_many(prefix, values);
        }
    }

    fn bind(&self, display: &BlockValue, scope: &BindScope) -> BoundBlock {
        let widget = self.field.widget();
        let mut context = PresentationContext::new(scope, display.clone())
            .with("input_type", widget.input_type())
            .with("label", self.field.label())
            .with("required", self.field.required())
            .with("render_value", widget.render_value());
        if let Some(help) = &self.field.options().help_text {
            context.set("help_text", Json::String(help.clone()));
        }
        for (key, value) in widget.context_attrs() {
            context.set(key, value);
        }
        BoundBlock::leaf(&self.name, BoundKind::Field, context)
    }

    fn media(&self) -> Media {
        self.field.media()
    }
}
