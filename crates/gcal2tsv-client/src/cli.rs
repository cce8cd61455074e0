//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gcal2tsv_core::TracingOutputFormat;

use crate::config::{AppConfig, OutputType};

/// gcal2tsv - Export Google Calendar events as a TSV work log
#[derive(Debug, Parser)]
#[command(name = "gcal2tsv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file [default: ./config.toml]
    #[arg(long, short, env = "GCAL2TSV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log format on stderr (compact, pretty, json)
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<TracingOutputFormat>,

    // --- Overrides of config.toml ---
    /// First day to export (YYYY-MM-DD), overrides Date.Start
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// End of the range (YYYY-MM-DD), overrides Date.End
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Output file, overrides Output.Filename
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output type (sjis, utf8, console), overrides Output.Type
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub output_type: Option<OutputType>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the configuration file to read.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(AppConfig::default_path)
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch events and write the work log (default)
    Export,

    /// Authorize access to Google Calendar and cache the token
    Auth {
        /// Ignore any cached token and authorize again
        #[arg(long, short)]
        force: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
