use serde::Serialize;
use serde_json::Value as Json;

use crate::block::{PipelineStage, StageFailure};
use crate::error::FlatError;
use crate::value::BlockValue;

// ============================================================================
// Per-submission result
// ============================================================================

/// Outcome of running one submission through a schema's pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    /// Where the submission came from (usually the file name)
    pub name: String,

    pub accepted: bool,

    /// Stage that rejected the submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<PipelineStage>,

    /// Every error, addressed by dotted path
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FlatError>,

    /// Client-editor error payload (`messages` / `blockErrors`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_data: Option<Json>,

    /// Cleaned value of an accepted submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Json>,
}

impl SubmissionResult {
    pub fn from_outcome(name: &str, outcome: Result<BlockValue, StageFailure>) -> Self {
        match outcome {
            Ok(value) => SubmissionResult {
                name: name.to_string(),
                accepted: true,
                failed_stage: None,
                errors: Vec::new(),
                error_data: None,
                value: Some(value.to_json()),
            },
            Err(failure) => SubmissionResult {
                name: name.to_string(),
                accepted: false,
                failed_stage: Some(failure.stage),
                errors: failure.errors.flatten(""),
                error_data: Some(failure.errors.as_json_data()),
                value: None,
            },
        }
    }

    /// A submission that could not be read at all.
    pub fn unreadable(name: &str, message: impl Into<String>) -> Self {
        SubmissionResult {
            name: name.to_string(),
            accepted: false,
            failed_stage: None,
            errors: vec![FlatError {
                path: String::new(),
                message: message.into(),
            }],
            error_data: None,
            value: None,
        }
    }
}

// ============================================================================
// Check report: aggregates multiple SubmissionResult instances
// ============================================================================

/// Report for a batch of submissions checked against one schema.
///
/// Consumed by the console, JSON and JUnit reporters.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub schema_name: String,

    /// SHA-1 of the schema source
    pub schema_fingerprint: String,

    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,

    /// Total execution duration in milliseconds (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub results: Vec<SubmissionResult>,
}

impl CheckReport {
    /// Build a report, computing the accepted/rejected counts.
    pub fn from_results(
        schema_name: &str,
        schema_fingerprint: &str,
        results: Vec<SubmissionResult>,
    ) -> Self {
        let total = results.len();
        let accepted = results.iter().filter(|r| r.accepted).count();
        Self {
            schema_name: schema_name.to_string(),
            schema_fingerprint: schema_fingerprint.to_string(),
            total,
            accepted,
            rejected: total - accepted,
            duration_ms: None,
            results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_accepted(&self) -> bool {
        self.rejected == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
