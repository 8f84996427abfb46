use serde::Serialize;

use crate::block::PipelineStage;
use crate::error::BlockErrors;

/// One pipeline stage of one submission, as written to the JSONL trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: i64,

    /// Submission the stage ran for
    pub run: String,

    pub stage: PipelineStage,

    /// Wire prefix of the root block
    pub prefix: String,

    pub ok: bool,

    pub error_count: usize,

    pub messages: Vec<String>,
}

impl TraceEvent {
    pub fn now(run: &str, stage: PipelineStage, prefix: &str) -> Self {
        Self {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            run: run.to_string(),
            stage,
            prefix: prefix.to_string(),
            ok: true,
            error_count: 0,
            messages: vec![],
        }
    }

    pub fn with_errors(mut self, errors: &BlockErrors) -> Self {
        let flat = errors.flatten("");
        self.ok = false;
        self.error_count = flat.len();
        self.messages = flat
            .into_iter()
            .map(|e| {
                if e.path.is_empty() {
                    e.message
                } else {
                    format!("{}: {}", e.path, e.message)
                }
            })
            .collect();
        self
    }
}
