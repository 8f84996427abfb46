pub mod block_model;
pub mod field_block;
pub mod list_block;
pub mod media;
pub mod pipeline;
pub mod record_block;
pub mod wire_key;

pub use block_model::{Block, BlockRef, Validator, validator};
pub use field_block::FieldBlock;
pub use list_block::{LIST_CHILD_NAME, ListBlock};
pub use media::Media;
pub use pipeline::{
    PipelineStage, StageFailure, encode_value, run_pipeline, run_pipeline_observed,
    run_pipeline_staged,
};
pub use record_block::RecordBlock;
