//! The default command: fetch the configured range and write the work log.

use std::io::{self, Write};

use tracing::info;

use gcal2tsv_providers::google::authorize;

use crate::config::AppConfig;
use crate::error::ClientResult;
use crate::pipeline::run_export;

/// Authorizes, fetches and exports.
///
/// The client secret is read before anything touches the network.
pub async fn run(config: &AppConfig) -> ClientResult<()> {
    config.validate()?;
    let google_config = config.to_provider_config()?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let mut client = authorize(&google_config, &mut stdin.lock(), &mut stdout, false).await?;
    let calendar = client.calendar_client(&google_config).await?;

    let report = run_export(config, &calendar, &mut stdout).await?;
    stdout.flush()?;

    info!(
        "exported {} of {} events ({} all-day, {} skipped)",
        report.summary.rows, report.fetched, report.all_day, report.skipped
    );
    if let Some(ref path) = report.summary.path {
        info!("work log written to {}", path.display());
    }

    Ok(())
}
