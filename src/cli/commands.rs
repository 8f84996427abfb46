use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::block::{Block, encode_value, run_pipeline, run_pipeline_staged};
use crate::cli::config::CheckOptions;
use crate::presentation::html::escape_html;
use crate::presentation::{BindScope, HtmlRenderer, Renderer};
use crate::report::{CheckReport, SubmissionResult, format_console_report, generate_junit_xml};
use crate::schema::{Schema, SchemaError, load_schema};
use crate::trace::TraceLogger;
use crate::value::{BlockValue, WireData};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed submission '{path}': {source}")]
    Data {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unknown output format '{0}' (expected console, json or junit)")]
    UnknownFormat(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CliError + '_ {
    move |source| CliError::Io {
        path: path.display().to_string(),
        source,
    }
}

// ============================================================================
// check subcommand
// ============================================================================

/// Check every submission and return whether all were accepted.
pub fn cmd_check(
    schema_path: &str,
    data_path: &str,
    options: &CheckOptions,
) -> Result<bool, CliError> {
    let schema = load_schema(schema_path)?;
    let prefix = options.prefix.as_deref().unwrap_or(&schema.prefix);
    let submissions = submission_files(Path::new(data_path))?;

    if submissions.is_empty() {
        tracing::warn!(path = data_path, "no submissions found");
        return Ok(true);
    }
    tracing::info!(count = submissions.len(), schema = %schema.name, "checking submissions");

    let tracer = match &options.trace {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    let start = std::time::Instant::now();

    let results = submissions
        .iter()
        .map(|path| check_submission(&schema, path, prefix, &tracer))
        .collect();

    let report = CheckReport::from_results(&schema.name, &schema.fingerprint, results)
        .with_duration(start.elapsed().as_millis());
    let all_accepted = report.all_accepted();

    let output_content = match options.format.as_str() {
        "console" => format_console_report(&report),
        "json" => report.to_json()? + "\n",
        "junit" => generate_junit_xml(&report),
        other => return Err(CliError::UnknownFormat(other.to_string())),
    };
    write_output(options.output.as_deref(), &output_content)?;

    Ok(all_accepted)
}

fn check_submission(
    schema: &Schema,
    path: &Path,
    prefix: &str,
    tracer: &TraceLogger,
) -> SubmissionResult {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let wire = match load_wire_data(path) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::warn!(submission = %name, error = %e, "skipping unreadable submission");
            return SubmissionResult::unreadable(&name, e.to_string());
        }
    };

    let outcome = if tracer.is_enabled() {
        tracer.run_traced(&name, schema.block.as_ref(), &wire, prefix)
    } else {
        run_pipeline_staged(schema.block.as_ref(), &wire, prefix)
    };
    SubmissionResult::from_outcome(&name, outcome)
}

// ============================================================================
// defaults subcommand
// ============================================================================

/// Wire data of the schema's default value, as pretty JSON.
pub fn cmd_defaults(schema_path: &str, prefix: Option<&str>) -> Result<String, CliError> {
    let schema = load_schema(schema_path)?;
    let prefix = prefix.unwrap_or(&schema.prefix);
    let block = schema.block.as_ref();
    let wire = encode_value(block, &block.default_value(), prefix);
    Ok(serde_json::to_string_pretty(&wire)? + "\n")
}

// ============================================================================
// render subcommand
// ============================================================================

/// Render the schema as HTML. With a submission, its values and errors are
/// bound into the page.
pub fn cmd_render(
    schema_path: &str,
    data_path: Option<&str>,
    prefix: Option<&str>,
    output: Option<&str>,
) -> Result<(), CliError> {
    let schema = load_schema(schema_path)?;
    let prefix = prefix.unwrap_or(&schema.prefix);
    let block = schema.block.as_ref();

    let html = match data_path {
        Some(path) => {
            let wire = load_wire_data(Path::new(path))?;
            render_submission(block, &wire, prefix)
        }
        None => {
            let display = block.to_display(&block.default_value());
            render_page(block, &display, BindScope::root(prefix))
        }
    };
    write_output(output, &html)
}

/// HTML for a submission: accepted values are re-encoded for display,
/// rejected ones are shown as submitted next to their errors.
pub fn render_submission(block: &dyn Block, wire: &WireData, prefix: &str) -> String {
    match run_pipeline(block, wire, prefix) {
        Ok(cleaned) => render_page(block, &block.to_display(&cleaned), BindScope::root(prefix)),
        Err(errors) => {
            let raw = match block.decode_wire(wire, prefix) {
                Ok(raw) => raw,
                Err(failure) => failure.value,
            };
            let scope = BindScope::root(prefix).with_errors(errors.into_vec());
            render_page(block, &raw, scope)
        }
    }
}

fn render_page(block: &dyn Block, display: &BlockValue, scope: BindScope) -> String {
    let mut out = String::new();
    let media = block.media();
    for css in &media.css {
        out.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n",
            escape_html(css)
        ));
    }
    for js in &media.js {
        out.push_str(&format!("<script src=\"{}\"></script>\n", escape_html(js)));
    }
    out.push_str(&HtmlRenderer.render(&block.bind(display, &scope)));
    out.push('\n');
    out
}

// ============================================================================
// Helpers
// ============================================================================

/// Submission files at `path`: the file itself, or every YAML/JSON file of a
/// directory sorted by name.
pub fn submission_files(path: &Path) -> Result<Vec<PathBuf>, CliError> {
    let metadata = std::fs::metadata(path).map_err(io_error(path))?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_error(path))? {
        let p = entry.map_err(io_error(path))?.path();
        if p.extension().is_some_and(|e| e == "yaml" || e == "yml" || e == "json") {
            files.push(p);
        }
    }
    // deterministic report order
    files.sort();
    Ok(files)
}

/// Read one submission. JSON is valid YAML, so both go through `serde_yaml`.
pub fn load_wire_data(path: &Path) -> Result<WireData, CliError> {
    let content = std::fs::read_to_string(path).map_err(io_error(path))?;
    serde_yaml::from_str(&content).map_err(|source| CliError::Data {
        path: path.display().to_string(),
        source,
    })
}

fn write_output(output: Option<&str>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, content).map_err(io_error(Path::new(path))),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
