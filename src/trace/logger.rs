use std::{fs::OpenOptions, io::Write, sync::Mutex};

use crate::block::{Block, StageFailure, run_pipeline_observed};
use crate::trace::trace::TraceEvent;
use crate::value::{BlockValue, WireData};

/// Appends pipeline events to a JSONL file. Write failures are logged and
/// otherwise ignored; a trace must never fail a run.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                tracing::warn!(path, error = %e, "could not open trace file");
                Self { file: None }
            }
        }
    }

    /// A logger that drops every event.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn log(&self, event: &TraceEvent) {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return,
        };

        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize trace event");
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(error = %e, "trace logger lock poisoned");
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            tracing::warn!(error = %e, "failed to write trace event");
        }
    }

    /// Run the pipeline for one submission, logging one event per stage.
    pub fn run_traced(
        &self,
        run: &str,
        block: &dyn Block,
        wire: &WireData,
        prefix: &str,
    ) -> Result<BlockValue, StageFailure> {
        run_pipeline_observed(block, wire, prefix, &mut |stage, errors| {
            let event = TraceEvent::now(run, stage, prefix);
            let event = match errors {
                Some(errors) => event.with_errors(errors),
                None => event,
            };
            self.log(&event);
        })
    }
}
