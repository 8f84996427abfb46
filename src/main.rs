use clap::Parser;
use content_blocks::cli::commands::{cmd_check, cmd_defaults, cmd_render};
use content_blocks::cli::config::{
    Cli, Commands, load_config, resolve_check_options, resolve_prefix, verbosity_filter,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(cli.verbose)));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Check {
            schema,
            data,
            prefix,
            format,
            output,
            trace,
        } => {
            let options = resolve_check_options(
                &config,
                prefix.as_deref(),
                format.as_deref(),
                output.as_deref(),
                trace.as_deref(),
            );
            let all_accepted = cmd_check(&schema, &data, &options)?;
            if !all_accepted {
                std::process::exit(1);
            }
        }
        Commands::Defaults { schema, prefix } => {
            let prefix = resolve_prefix(&config, prefix.as_deref());
            print!("{}", cmd_defaults(&schema, prefix.as_deref())?);
        }
        Commands::Render {
            schema,
            data,
            prefix,
            output,
        } => {
            let prefix = resolve_prefix(&config, prefix.as_deref());
            cmd_render(&schema, data.as_deref(), prefix.as_deref(), output.as_deref())?;
        }
    }

    Ok(())
}
