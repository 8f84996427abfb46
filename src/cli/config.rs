use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "content-blocks",
    version,
    about = "Decode, validate and render structured content submissions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: content-blocks.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run submissions through a schema's pipeline and report the outcome
    Check {
        /// Path to the YAML block schema
        #[arg(long)]
        schema: String,

        /// Submission file (YAML/JSON wire data) or a directory of them
        #[arg(long)]
        data: String,

        /// Wire prefix of the root block (default: schema prefix)
        #[arg(long)]
        prefix: Option<String>,

        /// Output format: console, json, junit
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Append per-stage JSONL trace events to this file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Print the wire data of a schema's default value
    Defaults {
        /// Path to the YAML block schema
        #[arg(long)]
        schema: String,

        /// Wire prefix of the root block (default: schema prefix)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Render a schema as HTML, optionally bound to a submission
    Render {
        /// Path to the YAML block schema
        #[arg(long)]
        schema: String,

        /// Submission to bind; errors are rendered next to their inputs
        #[arg(long)]
        data: Option<String>,

        /// Wire prefix of the root block (default: schema prefix)
        #[arg(long)]
        prefix: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `content-blocks.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Wire prefix used when neither the CLI nor the schema gives one
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub check: CheckConfig,

    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            format: "console".to_string(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    /// JSONL trace file; tracing is off when unset
    pub file: Option<String>,
}

fn default_console() -> String {
    "console".to_string()
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("content-blocks.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = config_path, error = %e, "ignoring malformed config file");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Resolution (CLI > config file > schema/built-in defaults)
// ============================================================================

/// Options of one `check` run after merging CLI flags with the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOptions {
    pub prefix: Option<String>,
    pub format: String,
    pub output: Option<String>,
    pub trace: Option<String>,
}

pub fn resolve_check_options(
    config: &AppConfig,
    prefix: Option<&str>,
    format: Option<&str>,
    output: Option<&str>,
    trace: Option<&str>,
) -> CheckOptions {
    CheckOptions {
        prefix: resolve_prefix(config, prefix),
        format: format.unwrap_or(&config.check.format).to_string(),
        output: output.map(str::to_string).or_else(|| config.check.output.clone()),
        trace: trace.map(str::to_string).or_else(|| config.trace.file.clone()),
    }
}

/// CLI prefix, else the config file's; `None` falls back to the schema.
pub fn resolve_prefix(config: &AppConfig, prefix: Option<&str>) -> Option<String> {
    prefix.map(str::to_string).or_else(|| config.prefix.clone())
}

/// `tracing` filter directive for a `-v` count. `RUST_LOG` still wins.
pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
