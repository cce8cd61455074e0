//! gcal2tsv CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use gcal2tsv_client::cli::{Cli, Command, ConfigAction};
use gcal2tsv_client::commands;
use gcal2tsv_client::config::AppConfig;
use gcal2tsv_client::error::ClientResult;
use gcal2tsv_core::{TracingConfig, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let mut tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Some(format) = cli.log_format {
        tracing_config = tracing_config.with_format(format);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    // Run the command
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config_path();

    if let Some(Command::Config {
        action: ConfigAction::Path,
    }) = cli.command
    {
        return commands::config::path(&config_path);
    }

    // Load configuration
    let mut config = AppConfig::load_from(&config_path)?;
    config.apply_overrides(cli.start, cli.end, cli.output, cli.output_type);

    // Handle subcommands
    match cli.command {
        Some(Command::Auth { force }) => commands::auth::run(&config, force).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
        Some(Command::Export) | None => commands::export::run(&config).await,
    }
}
