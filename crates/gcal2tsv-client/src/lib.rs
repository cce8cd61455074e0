//! CLI, configuration and the export pipeline
//!
//! This crate provides the `gcal2tsv` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;

pub use cli::Cli;
pub use config::{AppConfig, OutputType};
pub use error::{ClientError, ClientResult};
pub use pipeline::{PipelineReport, run_export};
