use std::fmt;
use std::sync::Arc;

use crate::block::media::Media;
use crate::error::{BlockErrors, DecodeFailure, ValidationError};
use crate::presentation::{BindScope, BoundBlock};
use crate::value::{BlockValue, WireData};

/// Block-level validation callback. Runs before a block looks at its children.
pub type Validator = Arc<dyn Fn(&BlockValue) -> Result<(), ValidationError> + Send + Sync>;

/// Shared handle to an immutable block definition.
pub type BlockRef = Arc<dyn Block>;

/// A composable unit of a content schema.
///
/// Definitions are built once and then only read; every method takes `&self`
/// and all per-request state travels through arguments and return values.
/// Wire keys are always passed in explicitly, never stored on the block.
pub trait Block: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Rename the block. Only valid while the block is still owned by its
    /// builder, before it is attached to a parent.
    fn set_name(&mut self, name: &str);

    /// Submitted wire data → raw value. On failure the partial raw value
    /// travels with the errors.
    fn decode_wire(&self, wire: &WireData, prefix: &str) -> Result<BlockValue, DecodeFailure>;

    /// Whether nothing was submitted for this block under `prefix`.
    fn value_omitted(&self, wire: &WireData, prefix: &str) -> bool;

    /// Raw value → domain value.
    fn to_domain(&self, raw: BlockValue) -> Result<BlockValue, BlockErrors>;

    /// Normalise a domain value.
    fn clean(&self, value: BlockValue) -> Result<BlockValue, BlockErrors>;

    /// Domain value → display value, shaped like `decode_wire` output.
    fn to_display(&self, value: &BlockValue) -> BlockValue;

    /// Business-rule validation of a domain value.
    fn validate(&self, value: &BlockValue) -> Result<(), BlockErrors>;

    /// Value of a freshly created block.
    fn default_value(&self) -> BlockValue;

    /// Display value → wire data. Inverse of `decode_wire`.
    fn encode_wire(&self, display: &BlockValue, prefix: &str, wire: &mut WireData);

    /// Bind a display value for rendering.
    fn bind(&self, display: &BlockValue, scope: &BindScope) -> BoundBlock;

    /// Assets this block and its children need.
    fn media(&self) -> Media;
}

/// Run block-level validators in order and collect every failure.
pub fn run_validators(validators: &[Validator], value: &BlockValue) -> Vec<ValidationError> {
    validators
        .iter()
        .filter_map(|validator| validator(value).err())
        .collect()
}

/// Wrap a closure as a [`Validator`].
pub fn validator<F>(f: F) -> Validator
where
    F: Fn(&BlockValue) -> Result<(), ValidationError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Error for a value whose shape does not match the block.
pub fn shape_error(block: &str, expected: &str, got: &BlockValue) -> BlockErrors {
    BlockErrors::from(crate::error::BlockError::generic(format!(
        "Block '{}' expected a {} value, got {}.",
        block,
        expected,
        got.kind_name()
    )))
}
