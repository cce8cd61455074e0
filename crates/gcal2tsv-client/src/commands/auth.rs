//! Authorization command.

use std::io;

use tracing::info;

use gcal2tsv_providers::google::authorize;

use crate::config::AppConfig;
use crate::error::ClientResult;

/// Runs only the credential step.
///
/// With a valid cached token this just confirms it (refreshing it if it has
/// expired). With `force`, the consent flow always runs and the cache is
/// replaced.
pub async fn run(config: &AppConfig, force: bool) -> ClientResult<()> {
    let google_config = config.to_provider_config()?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut client = authorize(&google_config, &mut stdin.lock(), &mut stdout, force).await?;
    client.access_token().await?;

    info!("Google authorization ready");
    println!("Authorized. Token cached at {}", client.cache().path().display());
    if !force {
        println!("Use --force to authorize again.");
    }

    Ok(())
}
