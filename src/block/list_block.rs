use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::block::block_model::{Block, BlockRef, Validator, run_validators, shape_error};
use crate::block::media::Media;
use crate::block::wire_key;
use crate::error::{BlockError, BlockErrors, DecodeFailure, ErrorAggregate};
use crate::presentation::{BindScope, BoundBlock, BoundKind, PresentationContext};
use crate::value::{BlockValue, ItemId, ListItem, WireData};

/// Fixed name of a list's child prototype.
pub const LIST_CHILD_NAME: &str = "item";

/// Repeated items of one child definition, each carrying a stable identity.
///
/// The child is a shared template: every item's value runs through it, but
/// per-item addressing is passed in on each call.
pub struct ListBlock {
    name: String,
    child: BlockRef,
    min: Option<usize>,
    max: Option<usize>,
    validators: Vec<Validator>,
    media: Media,
}

impl fmt::Debug for ListBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListBlock")
            .field("name", &self.name)
            .field("child", &self.child)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

impl ListBlock {
    pub fn new<B: Block + 'static>(child: B) -> Self {
        Self::from_boxed(Box::new(child))
    }

    pub fn from_boxed(mut child: Box<dyn Block>) -> Self {
        child.set_name(LIST_CHILD_NAME);
        ListBlock {
            name: String::new(),
            child: Arc::from(child),
            min: None,
            max: None,
            validators: Vec::new(),
            media: Media::default(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Bounds in the `-1 = unbounded` convention used by schemas.
    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.min = usize::try_from(min).ok();
        self.max = usize::try_from(max).ok();
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_media(mut self, media: Media) -> Self {
        self.media = media;
        self
    }

    pub fn child(&self) -> &BlockRef {
        &self.child
    }

    pub fn min(&self) -> Option<usize> {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Apply `op` to every item's data, keeping ids and collecting failures
    /// by index.
    fn map_items<F>(&self, value: BlockValue, op: F) -> Result<BlockValue, BlockErrors>
    where
        F: Fn(&BlockRef, BlockValue) -> Result<BlockValue, BlockErrors>,
    {
        let items = match value {
            BlockValue::Empty => return Ok(BlockValue::List(Vec::new())),
            BlockValue::List(items) => items,
            other => return Err(shape_error(&self.name, "list", &other)),
        };

        let mut errors = ErrorAggregate::new();
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match op(&self.child, item.data) {
                Ok(data) => out.push(ListItem::new(item.id, data)),
                Err(errs) => errors.add_error(index, errs),
            }
        }
        errors.into_result(BlockValue::List(out))
    }

    /// Item id submitted under `prefix-id-N`. Absent ids are minted; a
    /// malformed one is reported and replaced.
    fn item_id(
        &self,
        wire: &WireData,
        prefix: &str,
        index: usize,
        errors: &mut ErrorAggregate,
    ) -> ItemId {
        match wire.get(&wire_key::item_id_key(prefix, index)) {
            None => ItemId::new(),
            Some(raw) if raw.trim().is_empty() => ItemId::new(),
            Some(raw) => ItemId::parse(raw).unwrap_or_else(|| {
                errors.add_extra(BlockError::generic(format!(
                    "Item {} has an invalid id '{}'.",
                    index, raw
                )));
                ItemId::new()
            }),
        }
    }
}

/// Whether the client sent anything for item `index`: its data or its id.
fn item_submitted(wire: &WireData, prefix: &str, index: usize) -> bool {
    wire.has_key_under(&wire_key::item_key(prefix, index))
        || wire.contains_key(&wire_key::item_id_key(prefix, index))
}

impl Block for ListBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn decode_wire(&self, wire: &WireData, prefix: &str) -> Result<BlockValue, DecodeFailure> {
        let mut errors = ErrorAggregate::new();

        let declared = match wire.get(&wire_key::added_key(prefix)) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(count) => count,
                Err(_) => {
                    errors.add_extra(BlockError::generic(format!(
                        "Invalid item count '{}'.",
                        raw
                    )));
                    tracing::warn!(prefix, raw, "list submitted an unparsable item count");
                    return errors.into_decoded(BlockValue::Empty);
                }
            },
            None if !item_submitted(wire, prefix, 0) => {
                return Ok(BlockValue::List(Vec::new()));
            }
            None => {
                errors.add_extra(BlockError::generic("Missing item count."));
                tracing::warn!(prefix, "list items submitted without an item count");
                return errors.into_decoded(BlockValue::Empty);
            }
        };

        // the count is client-controlled: scan at most one past `max`, or
        // no further than the number of submitted keys
        let limit = match self.max {
            Some(max) => declared.min(max.saturating_add(1)),
            None => declared.min(wire.len()),
        };

        // contiguous scan: the first omitted index ends the list
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut scanned = 0;
        for index in 0..limit {
            let item_key = wire_key::item_key(prefix, index);
            if self.child.value_omitted(wire, &item_key) {
                break;
            }
            scanned += 1;

            let id = self.item_id(wire, prefix, index, &mut errors);
            if !seen.insert(id) {
                errors.add_extra(BlockError::generic(format!(
                    "Item {} repeats the id of an earlier item.",
                    index
                )));
            }
            match self.child.decode_wire(wire, &item_key) {
                Ok(data) => items.push(ListItem::new(id, data)),
                Err(failure) => {
                    errors.add_error(index, failure.errors);
                    items.push(ListItem::new(id, failure.value));
                }
            }
        }

        if let Some(min) = self.min.filter(|min| scanned < *min) {
            errors.add_extra(BlockError::generic(format!(
                "The minimum number of items is {}.",
                min
            )));
        }
        if let Some(max) = self.max.filter(|max| scanned > *max) {
            errors.add_extra(BlockError::generic(format!(
                "The maximum number of items is {}.",
                max
            )));
        }
        if scanned != declared {
            tracing::warn!(prefix, declared, scanned, "list item count mismatch");
            errors.add_extra(BlockError::generic(format!(
                "Expected {} items but received {}.",
                declared, scanned
            )));
        }

        tracing::debug!(prefix, declared, scanned, "decoded list items");
        errors.into_decoded(BlockValue::List(items))
    }

    fn value_omitted(&self, wire: &WireData, prefix: &str) -> bool {
        !wire.contains_key(&wire_key::added_key(prefix))
    }

    fn to_domain(&self, raw: BlockValue) -> Result<BlockValue, BlockErrors> {
        self.map_items(raw, |child, data| child.to_domain(data))
    }

    fn clean(&self, value: BlockValue) -> Result<BlockValue, BlockErrors> {
        self.map_items(value, |child, data| child.clean(data))
    }

    fn to_display(&self, value: &BlockValue) -> BlockValue {
        let items = value.as_list().unwrap_or_default();
        BlockValue::List(
            items
                .iter()
                .map(|item| item.with_data(self.child.to_display(&item.data)))
                .collect(),
        )
    }

    fn validate(&self, value: &BlockValue) -> Result<(), BlockErrors> {
        let own = run_validators(&self.validators, value);
        if !own.is_empty() {
            return Err(BlockErrors::from(own));
        }
        // cardinality was enforced by decode_wire, not here
        let items = match value {
            BlockValue::Empty => return Ok(()),
            BlockValue::List(items) => items,
            other => return Err(shape_error(&self.name, "list", other)),
        };

        let mut errors = ErrorAggregate::new();
        for (index, item) in items.iter().enumerate() {
            if let Err(errs) = self.child.validate(&item.data) {
                errors.add_error(index, errs);
            }
        }
        errors.into_result(())
    }

    fn default_value(&self) -> BlockValue {
        let count = self.min.unwrap_or(0);
        BlockValue::List(
            (0..count)
                .map(|_| ListItem::fresh(self.child.default_value()))
                .collect(),
        )
    }

    fn encode_wire(&self, display: &BlockValue, prefix: &str, wire: &mut WireData) {
        let items = display.as_list().unwrap_or_default();
        wire.insert(wire_key::added_key(prefix), items.len().to_string());
        for (index, item) in items.iter().enumerate() {
            wire.insert(wire_key::item_id_key(prefix, index), item.id.to_string());
            self.child
                .encode_wire(&item.data, &wire_key::item_key(prefix, index), wire);
        }
    }

    fn bind(&self, display: &BlockValue, scope: &BindScope) -> BoundBlock {
        // no value yet: show the minimum number of default rows
        let items: Vec<ListItem> = match display {
            BlockValue::List(items) => items.clone(),
            _ => (0..self.min.unwrap_or(0))
                .map(|_| ListItem::fresh(self.child.to_display(&self.child.default_value())))
                .collect(),
        };

        let rows = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                // position, not id, addresses the row on the wire
                let row_scope = scope.child(index);
                let row_context = PresentationContext::new(&row_scope, item.data.clone())
                    .with("item_id", item.id.to_string())
                    .with("id_key", wire_key::item_id_key(&scope.key, index))
                    .with("index", index);
                BoundBlock::leaf(LIST_CHILD_NAME, BoundKind::ListItem, row_context)
                    .with_children(vec![self.child.bind(&item.data, &row_scope)])
            })
            .collect();

        let mut context = PresentationContext::new(scope, BlockValue::List(items.clone()))
            .with("added_key", wire_key::added_key(&scope.key))
            .with("count", items.len());
        if let Some(min) = self.min {
            context.set("min_num", min);
        }
        if let Some(max) = self.max {
            context.set("max_num", max);
        }
        BoundBlock::leaf(&self.name, BoundKind::List, context).with_children(rows)
    }

    fn media(&self) -> Media {
        let mut media = self.media.clone();
        media.merge(&self.child.media());
        media
    }
}
