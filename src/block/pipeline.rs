use std::fmt;

use serde::Serialize;

use crate::block::block_model::Block;
use crate::error::BlockErrors;
use crate::value::{BlockValue, WireData};

// ============================================================================
// Pipeline stages
// ============================================================================

/// One step of the value pipeline, in the order a form engine runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Decode,
    ToDomain,
    Clean,
    Validate,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::Decode,
        PipelineStage::ToDomain,
        PipelineStage::Clean,
        PipelineStage::Validate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Decode => "decode",
            PipelineStage::ToDomain => "to_domain",
            PipelineStage::Clean => "clean",
            PipelineStage::Validate => "validate",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors of a failed run together with the stage that produced them.
#[derive(Debug, Clone)]
pub struct StageFailure {
    pub stage: PipelineStage,
    pub errors: BlockErrors,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.errors)
    }
}

impl std::error::Error for StageFailure {}

// ============================================================================
// Driving a block
// ============================================================================

/// Decode, convert, clean and validate one submission.
///
/// The first failing stage stops the run; later stages never see a value the
/// earlier ones rejected.
pub fn run_pipeline_staged(
    block: &dyn Block,
    wire: &WireData,
    prefix: &str,
) -> Result<BlockValue, StageFailure> {
    run_pipeline_observed(block, wire, prefix, &mut |_, _| {})
}

/// [`run_pipeline_staged`], reporting every stage that ran to `observe`.
pub fn run_pipeline_observed(
    block: &dyn Block,
    wire: &WireData,
    prefix: &str,
    observe: &mut dyn FnMut(PipelineStage, Option<&BlockErrors>),
) -> Result<BlockValue, StageFailure> {
    let mut step = |stage: PipelineStage, result: Result<BlockValue, BlockErrors>| match result {
        Ok(value) => {
            observe(stage, None);
            Ok(value)
        }
        Err(errors) => {
            tracing::debug!(prefix, %stage, count = errors.len(), "pipeline stage failed");
            observe(stage, Some(&errors));
            Err(StageFailure { stage, errors })
        }
    };

    let decoded = block.decode_wire(wire, prefix).map_err(BlockErrors::from);
    let raw = step(PipelineStage::Decode, decoded)?;
    let domain = step(PipelineStage::ToDomain, block.to_domain(raw))?;
    let cleaned = step(PipelineStage::Clean, block.clean(domain))?;
    let validated = block.validate(&cleaned).map(|()| cleaned);
    let cleaned = step(PipelineStage::Validate, validated)?;

    tracing::debug!(prefix, block = block.name(), "pipeline accepted submission");
    Ok(cleaned)
}

/// [`run_pipeline_staged`] without the stage tag.
pub fn run_pipeline(
    block: &dyn Block,
    wire: &WireData,
    prefix: &str,
) -> Result<BlockValue, BlockErrors> {
    run_pipeline_staged(block, wire, prefix).map_err(|failure| failure.errors)
}

/// Wire data a client would submit when editing `value` unchanged.
pub fn encode_value(block: &dyn Block, value: &BlockValue, prefix: &str) -> WireData {
    let mut wire = WireData::new();
    block.encode_wire(&block.to_display(value), prefix, &mut wire);
    wire
}
