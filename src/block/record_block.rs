use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::block::block_model::{Block, BlockRef, Validator, run_validators, shape_error};
use crate::block::media::Media;
use crate::block::wire_key;
use crate::error::{BlockError, BlockErrors, DecodeFailure, ErrorAggregate, ValidationError};
use crate::presentation::{BindScope, BoundBlock, BoundKind, PresentationContext};
use crate::value::{BlockValue, Fields, RecordType, TypedValue, WireData};

// ============================================================================
// Typed narrowing
// ============================================================================

/// Narrows a converted record into a host type. Attached to the block
/// definition and applied at the `to_domain` / `clean` boundary.
trait RecordConverter: Send + Sync + fmt::Debug {
    fn narrow(&self, fields: &Fields) -> Result<BlockValue, ValidationError>;
}

struct TypedConverter<T>(PhantomData<fn() -> T>);

impl<T> fmt::Debug for TypedConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedConverter<{}>", std::any::type_name::<T>())
    }
}

impl<T: RecordType> RecordConverter for TypedConverter<T> {
    fn narrow(&self, fields: &Fields) -> Result<BlockValue, ValidationError> {
        T::from_fields(fields).map(|value| BlockValue::Typed(TypedValue::new(value)))
    }
}

// ============================================================================
// Record block
// ============================================================================

/// Named, ordered children. Declaration order drives rendering and wire key
/// iteration.
pub struct RecordBlock {
    name: String,
    children: IndexMap<String, BlockRef>,
    validators: Vec<Validator>,
    converter: Option<Arc<dyn RecordConverter>>,
    media: Media,
}

impl fmt::Debug for RecordBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBlock")
            .field("name", &self.name)
            .field("children", &self.children)
            .field("validators", &self.validators.len())
            .field("converter", &self.converter)
            .finish_non_exhaustive()
    }
}

impl RecordBlock {
    pub fn new(name: &str) -> Self {
        RecordBlock {
            name: name.to_string(),
            children: IndexMap::new(),
            validators: Vec::new(),
            converter: None,
            media: Media::default(),
        }
    }

    /// Attach a child under `name`. The child is renamed before it becomes
    /// shared.
    pub fn child<B: Block + 'static>(self, name: &str, block: B) -> Self {
        self.child_boxed(name, Box::new(block))
    }

    pub fn child_boxed(mut self, name: &str, mut block: Box<dyn Block>) -> Self {
        block.set_name(name);
        self.children.insert(name.to_string(), Arc::from(block));
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Materialise converted and cleaned values as `T`.
    pub fn with_type<T: RecordType>(mut self) -> Self {
        self.converter = Some(Arc::new(TypedConverter::<T>(PhantomData)));
        self
    }

    pub fn with_media(mut self, media: Media) -> Self {
        self.media = media;
        self
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &BlockRef)> {
        self.children.iter().map(|(name, block)| (name.as_str(), block))
    }

    pub fn child_block(&self, name: &str) -> Option<&BlockRef> {
        self.children.get(name)
    }

    /// Apply `op` to every child's entry of `fields`, collecting failures by
    /// child name, then narrow the result if a host type is attached.
    fn map_children<F>(&self, mut fields: Fields, op: F) -> Result<BlockValue, BlockErrors>
    where
        F: Fn(&BlockRef, BlockValue) -> Result<BlockValue, BlockErrors>,
    {
        let mut errors = ErrorAggregate::new();
        let mut out = Fields::new();
        for (name, child) in &self.children {
            let value = fields.shift_remove(name).unwrap_or_default();
            match op(child, value) {
                Ok(converted) => {
                    out.insert(name.clone(), converted);
                }
                Err(errs) => errors.add_error(name.as_str(), errs),
            }
        }
        if errors.has_errors() {
            return Err(BlockErrors::from(errors));
        }
        match &self.converter {
            Some(converter) => converter.narrow(&out).map_err(BlockErrors::from),
            None => Ok(BlockValue::Record(out)),
        }
    }

    /// Record view of a domain value, or a shape error.
    fn fields_of(&self, value: BlockValue) -> Result<Fields, BlockErrors> {
        match value {
            BlockValue::Record(fields) => Ok(fields),
            BlockValue::Typed(typed) => Ok(typed.to_fields()),
            other => Err(shape_error(&self.name, "record", &other)),
        }
    }
}

impl Block for RecordBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn decode_wire(&self, wire: &WireData, prefix: &str) -> Result<BlockValue, DecodeFailure> {
        // every child is decoded so one submission reports all of them
        let mut errors = ErrorAggregate::new();
        let mut fields = Fields::new();
        for (name, child) in &self.children {
            let value = match child.decode_wire(wire, &wire_key::child_key(prefix, name)) {
                Ok(value) => value,
                Err(failure) => {
                    errors.add_error(name.as_str(), failure.errors);
                    failure.value
                }
            };
            fields.insert(name.clone(), value);
        }
        errors.into_decoded(BlockValue::Record(fields))
    }

    fn value_omitted(&self, wire: &WireData, prefix: &str) -> bool {
        self.children
            .iter()
            .all(|(name, child)| child.value_omitted(wire, &wire_key::child_key(prefix, name)))
    }

    fn to_domain(&self, raw: BlockValue) -> Result<BlockValue, BlockErrors> {
        if raw.is_empty() {
            return Ok(BlockValue::Empty);
        }
        let fields = self.fields_of(raw)?;
        self.map_children(fields, |child, value| child.to_domain(value))
    }

    fn clean(&self, value: BlockValue) -> Result<BlockValue, BlockErrors> {
        if value.is_empty() {
            return Ok(BlockValue::Empty);
        }
        let fields = self.fields_of(value)?;
        self.map_children(fields, |child, value| child.clean(value))
    }

    fn to_display(&self, value: &BlockValue) -> BlockValue {
        // a typed value seeds the map so it can carry extra, non-child keys
        let (mut display, source) = match value {
            BlockValue::Typed(typed) => {
                let fields = typed.to_fields();
                (fields.clone(), fields)
            }
            BlockValue::Record(fields) => (Fields::new(), fields.clone()),
            _ => (Fields::new(), Fields::new()),
        };
        for (name, child) in &self.children {
            let child_value = source.get(name).cloned().unwrap_or_default();
            display.insert(name.clone(), child.to_display(&child_value));
        }
        BlockValue::Record(display)
    }

    fn validate(&self, value: &BlockValue) -> Result<(), BlockErrors> {
        // record validators may target a child with ValidationError::for_field
        let own = run_validators(&self.validators, value);
        if !own.is_empty() {
            let errors = own.into_iter().map(BlockError::Field);
            return Err(BlockErrors::from(ErrorAggregate::from_errors(errors)));
        }
        if value.is_empty() {
            return Ok(());
        }
        let fields = self.fields_of(value.clone())?;

        let mut errors = ErrorAggregate::new();
        for (name, child) in &self.children {
            let empty = BlockValue::Empty;
            let child_value = fields.get(name).unwrap_or(&empty);
            if let Err(errs) = child.validate(child_value) {
                errors.add_error(name.as_str(), errs);
            }
        }
        errors.into_result(())
    }

    fn default_value(&self) -> BlockValue {
        BlockValue::Record(
            self.children
                .iter()
                .map(|(name, child)| (name.clone(), child.default_value()))
                .collect(),
        )
    }

    fn encode_wire(&self, display: &BlockValue, prefix: &str, wire: &mut WireData) {
        let fields = display.record_fields().unwrap_or_default();
        for (name, child) in &self.children {
            let child_value = fields.get(name).cloned().unwrap_or_default();
            child.encode_wire(&child_value, &wire_key::child_key(prefix, name), wire);
        }
    }

    fn bind(&self, display: &BlockValue, scope: &BindScope) -> BoundBlock {
        let fields = display.record_fields().unwrap_or_default();
        let children = self
            .children
            .iter()
            .map(|(name, child)| {
                let child_value = fields.get(name).cloned().unwrap_or_default();
                child.bind(&child_value, &scope.child(name.as_str()))
            })
            .collect();
        let context = PresentationContext::new(scope, display.clone());
        BoundBlock::leaf(&self.name, BoundKind::Record, context).with_children(children)
    }

    fn media(&self) -> Media {
        let mut media = self.media.clone();
        for child in self.children.values() {
            media.merge(&child.media());
        }
        media
    }
}
