//! Obtaining an authorized Google client.
//!
//! A cached token is used when present. Otherwise the user is sent through
//! the copy/paste consent flow and the resulting token is cached for the
//! next run.

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;
use super::oauth::OAuthClient;
use super::tokens::{TokenCache, TokenInfo};

/// A token together with what is needed to keep it fresh.
#[derive(Debug)]
pub struct AuthorizedClient {
    oauth: OAuthClient,
    cache: TokenCache,
    token: TokenInfo,
}

impl AuthorizedClient {
    /// Returns the current token.
    pub fn token(&self) -> &TokenInfo {
        &self.token
    }

    /// Returns the token cache backing this client.
    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Returns a usable access token, refreshing it first if it has expired.
    ///
    /// A refreshed token is written back to the cache.
    pub async fn access_token(&mut self) -> ProviderResult<String> {
        if self.token.is_expired() {
            let refresh_token = self
                .token
                .refresh_token
                .clone()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    ProviderError::authorization(
                        "cached token has expired and has no refresh token; run `gcal2tsv auth --force`",
                    )
                })?;

            debug!("refreshing expired access token");
            let refreshed = self.oauth.refresh_token(&refresh_token).await?;
            if let Err(e) = self.cache.save(&refreshed) {
                warn!("failed to persist refreshed token: {}", e);
            }
            self.token = refreshed;
        }

        Ok(self.token.access_token.clone())
    }

    /// Builds a Calendar API client carrying a fresh access token.
    pub async fn calendar_client(
        &mut self,
        config: &GoogleConfig,
    ) -> ProviderResult<GoogleCalendarClient> {
        let access_token = self.access_token().await?;
        GoogleCalendarClient::from_config(access_token, config)
    }
}

/// Returns an authorized client, running the consent flow if needed.
///
/// The prompt is written to `output` and the authorization code is read as
/// one line from `input`. With `force`, any cached token is ignored and
/// replaced.
///
/// # Errors
///
/// Returns an error if the code cannot be read or exchanged, or if the new
/// token cannot be cached.
pub async fn authorize<R, W>(
    config: &GoogleConfig,
    input: &mut R,
    output: &mut W,
    force: bool,
) -> ProviderResult<AuthorizedClient>
where
    R: BufRead,
    W: Write,
{
    let oauth = OAuthClient::new(config.credentials.clone(), config.timeout)?;
    let cache = TokenCache::new(&config.token_path);

    if !force {
        match cache.load() {
            Ok(Some(token)) => {
                return Ok(AuthorizedClient {
                    oauth,
                    cache,
                    token,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("ignoring unreadable token cache {:?}: {}", cache.path(), e),
        }
    }

    let token = token_from_web(&oauth, config, input, output).await?;

    writeln!(output, "Saving credential file to: {}", cache.path().display())
        .map_err(prompt_error)?;
    cache.save(&token)?;
    info!("authorization complete");

    Ok(AuthorizedClient {
        oauth,
        cache,
        token,
    })
}

async fn token_from_web<R, W>(
    oauth: &OAuthClient,
    config: &GoogleConfig,
    input: &mut R,
    output: &mut W,
) -> ProviderResult<TokenInfo>
where
    R: BufRead,
    W: Write,
{
    let url = oauth.auth_url(&config.scopes)?;

    writeln!(
        output,
        "Go to the following link in your browser then type the authorization code:\n{}",
        url
    )
    .and_then(|()| output.flush())
    .map_err(prompt_error)?;

    if config.open_browser
        && let Err(e) = open::that(&url)
    {
        warn!("failed to open browser: {}", e);
    }

    let mut line = String::new();
    input.read_line(&mut line).map_err(|e| {
        ProviderError::io(format!("unable to read authorization code: {}", e)).with_source(e)
    })?;

    let code = line.trim();
    if code.is_empty() {
        return Err(ProviderError::authorization(
            "unable to read authorization code: no code entered",
        ));
    }

    oauth.exchange_code(code).await.map_err(|e| {
        if e.code().is_auth() {
            ProviderError::authorization(format!(
                "unable to retrieve token from web: {}",
                e.message()
            ))
        } else {
            e
        }
    })
}

fn prompt_error(e: std::io::Error) -> ProviderError {
    ProviderError::io(format!("failed to write prompt: {}", e)).with_source(e)
}
