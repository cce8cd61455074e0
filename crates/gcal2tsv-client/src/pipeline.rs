//! Fetch, transform and export.
//!
//! The pipeline is generic over [`EventSource`] so it runs the same way
//! against the Google client and against a fixed list of events.

use std::io::Write;

use tracing::info;

use gcal2tsv_core::{ExportSummary, export, print_console, transform_events};
use gcal2tsv_providers::EventSource;

use crate::config::AppConfig;
use crate::error::ClientResult;

/// Counts reported after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Events returned by the source.
    pub fetched: usize,
    /// Timed events dropped because their timestamps did not parse.
    pub skipped: usize,
    /// All-day events left out.
    pub all_day: usize,
    /// What was written.
    pub summary: ExportSummary,
}

/// Runs one export for the configured date range.
///
/// The progress line, the echoed rows and, for console output, the event
/// listing are written to `out`.
pub async fn run_export<S, W>(
    config: &AppConfig,
    source: &S,
    out: &mut W,
) -> ClientResult<PipelineReport>
where
    S: EventSource + ?Sized,
    W: Write,
{
    let range = config.date_range()?;
    writeln!(out, "{}", range)?;

    let events = source
        .list_events(&config.gcal.calendar_id, range.to_window())
        .await?;
    info!(
        "fetched {} events from {} calendar {}",
        events.len(),
        source.name(),
        config.gcal.calendar_id
    );

    let outcome = transform_events(&events);

    let summary = match config.export_options() {
        Some(options) => export(&outcome.records, &config.output.filename, options, &mut *out)?,
        None => print_console(&outcome.records, &mut *out)?,
    };

    Ok(PipelineReport {
        fetched: events.len(),
        skipped: outcome.skipped.len(),
        all_day: outcome.all_day,
        summary,
    })
}
