//! OAuth token persistence.
//!
//! The token is cached as JSON under `~/.credentials/` so that the
//! interactive authorization only happens on the first run. The file layout
//! (`access_token`, `token_type`, `refresh_token`, `expiry`) matches what the
//! Go oauth2 package writes, so existing caches keep working.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

/// Directory under the home directory holding cached credentials.
pub const TOKEN_DIR: &str = ".credentials";

/// File name of the cached token, before URL escaping.
pub const TOKEN_FILE_NAME: &str = "calendar-gcal2tsv.json";

/// Seconds before the real expiry at which a token is treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// An OAuth access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    pub access_token: String,

    /// The token type, normally `Bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// The refresh token for obtaining new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the access token expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl TokenInfo {
    /// Creates a new token from OAuth response data.
    pub fn new(
        access_token: impl Into<String>,
        token_type: Option<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.unwrap_or_else(default_token_type),
            refresh_token,
            expiry: expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }

    /// Returns the expiry, ignoring the zero time Go writes for "no expiry".
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry.filter(|e| e.year() > 1)
    }

    /// Returns true if the access token is expired or about to expire at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expiry) => now + Duration::seconds(EXPIRY_MARGIN_SECS) >= expiry,
            None => false,
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if the token can be refreshed.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

/// File-backed token cache.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Creates a cache at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns `<home>/.credentials/<escaped TOKEN_FILE_NAME>`.
    pub fn default_path() -> ProviderResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            ProviderError::configuration("unable to get path to cached credential file: no home directory")
        })?;
        Ok(home
            .join(TOKEN_DIR)
            .join(urlencoding::encode(TOKEN_FILE_NAME).as_ref()))
    }

    /// Returns the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the cache directory, readable by the owner only.
    pub fn ensure_dir(&self) -> ProviderResult<()> {
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        if parent.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(parent).map_err(|e| {
            ProviderError::io(format!(
                "failed to create credential directory {}: {}",
                parent.display(),
                e
            ))
            .with_source(e)
        })?;
        debug!("created credential directory {:?}", parent);
        Ok(())
    }

    /// Loads the cached token.
    ///
    /// Returns `Ok(None)` if no cache file exists.
    pub fn load(&self) -> ProviderResult<Option<TokenInfo>> {
        if !self.path.exists() {
            debug!("no token file at {:?}", self.path);
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::io(format!("failed to read token file: {}", e)).with_source(e)
        })?;

        let token: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!("failed to parse token file: {}", e))
                .with_source(e)
        })?;

        info!("loaded token from {:?}", self.path);
        Ok(Some(token))
    }

    /// Writes the token, replacing any previous cache.
    ///
    /// On Unix the file is created with mode `0600`.
    pub fn save(&self, token: &TokenInfo) -> ProviderResult<()> {
        self.ensure_dir()?;

        let content = serde_json::to_string_pretty(token)
            .map_err(|e| ProviderError::internal(format!("failed to serialize token: {}", e)))?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| {
            ProviderError::io(format!("unable to cache oauth token: {}", e)).with_source(e)
        })?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .map_err(|e| {
                ProviderError::io(format!("failed to write token file: {}", e)).with_source(e)
            })?;

        // An existing file keeps its old mode on open; tighten it.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)) {
                warn!("unable to restrict permissions of {:?}: {}", self.path, e);
            }
        }

        debug!("saved token to {:?}", self.path);
        Ok(())
    }
}
