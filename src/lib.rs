//! Composable content blocks.
//!
//! A block definition (a scalar field, a record of named children or a list
//! of identified items) drives one submission through the value pipeline:
//! wire data is decoded into a raw value, converted to a domain value,
//! cleaned and validated, and can be turned back into display values and
//! wire data for editing. Errors come back shaped like the block tree so
//! every message can be shown next to the input it belongs to.

pub mod block;
pub mod cli;
pub mod error;
pub mod field;
pub mod presentation;
pub mod report;
pub mod schema;
pub mod trace;
pub mod value;

pub use block::{
    Block, BlockRef, FieldBlock, ListBlock, Media, PipelineStage, RecordBlock, run_pipeline,
};
pub use error::{
    BlockError, BlockErrors, DecodeFailure, ErrorAggregate, ErrorKey, ValidationError,
};
pub use value::{BlockValue, Fields, ItemId, ListItem, RecordType, WireData};
