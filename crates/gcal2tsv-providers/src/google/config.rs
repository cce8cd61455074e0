//! Google Calendar provider configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// Default authorization endpoint, used when the client secret omits `auth_uri`.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Default token endpoint, used when the client secret omits `token_uri`.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Redirect URI of the copy/paste flow for installed applications.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// OAuth 2.0 client configuration for Google API access.
///
/// Built from the client secret JSON downloaded from the Google Cloud
/// Console for a desktop ("installed") application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
    /// Authorization endpoint the user is sent to.
    pub auth_uri: String,
    /// Token endpoint used for code exchange and refresh.
    pub token_uri: String,
    /// Redirect URI registered for the client.
    pub redirect_uri: String,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// Supports multiple formats:
/// 1. Google Cloud Console format with "installed" or "web" section
/// 2. Flat format with client_id and client_secret at root level (e.g., from gcloud)
#[derive(Debug, Deserialize)]
struct GoogleCredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

/// OAuth credentials within a nested section of the credentials JSON file.
#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl OAuthCredentials {
    /// Creates credentials using Google's default endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_uri: GOOGLE_AUTH_URL.to_string(),
            token_uri: GOOGLE_TOKEN_URL.to_string(),
            redirect_uri: OOB_REDIRECT_URI.to_string(),
        }
    }

    /// Builder method to override both OAuth endpoints.
    pub fn with_endpoints(
        mut self,
        auth_uri: impl Into<String>,
        token_uri: impl Into<String>,
    ) -> Self {
        self.auth_uri = auth_uri.into();
        self.token_uri = token_uri.into();
        self
    }

    /// Loads OAuth credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "unable to read client secret file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        Self::from_json(&content)
    }

    /// Parses OAuth credentials from a Google credentials JSON string.
    ///
    /// Supports multiple formats:
    /// 1. Google Cloud Console format: `{"installed": {"client_id": "...", "client_secret": "..."}}`
    /// 2. Flat format: `{"client_id": "...", "client_secret": "..."}`
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: GoogleCredentialsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!(
                "unable to parse client secret file to config: {}",
                e
            ))
        })?;

        // Nested format first (installed or web section)
        if let Some(creds) = file.installed.or(file.web) {
            let mut credentials = Self::new(creds.client_id, creds.client_secret);
            if let Some(auth_uri) = creds.auth_uri {
                credentials.auth_uri = auth_uri;
            }
            if let Some(token_uri) = creds.token_uri {
                credentials.token_uri = token_uri;
            }
            if let Some(redirect_uri) = creds.redirect_uris.into_iter().next() {
                credentials.redirect_uri = redirect_uri;
            }
            return Ok(credentials);
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(ProviderError::configuration(
            "client secret file must contain an 'installed'/'web' section or 'client_id'/'client_secret' at root level",
        ))
    }

    /// Validates that the credentials appear to be correctly formatted.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        if self.auth_uri.is_empty() || self.token_uri.is_empty() {
            return Err("auth_uri and token_uri must not be empty");
        }
        Ok(())
    }
}

/// Configuration for the Google Calendar provider.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth credentials for API access.
    pub credentials: OAuthCredentials,

    /// Path of the cached OAuth token.
    ///
    /// Defaults to `~/.credentials/calendar-gcal2tsv.json`.
    pub token_path: PathBuf,

    /// Request timeout.
    pub timeout: Duration,

    /// Base URL of the Calendar API v3.
    pub api_base_url: String,

    /// Whether to try opening the authorization URL in a browser.
    pub open_browser: bool,

    /// OAuth scopes to request.
    ///
    /// Defaults to `["https://www.googleapis.com/auth/calendar.readonly"]`.
    pub scopes: Vec<String>,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default OAuth scope for read-only calendar access.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar.readonly";

    /// Default Calendar API base URL.
    pub const DEFAULT_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Creates a new Google configuration with the given credentials.
    ///
    /// The token path falls back to `./` when the home directory is unknown;
    /// use [`super::TokenCache::default_path`] to surface that as an error.
    pub fn new(credentials: OAuthCredentials) -> Self {
        let token_path = super::TokenCache::default_path()
            .unwrap_or_else(|_| PathBuf::from(super::tokens::TOKEN_FILE_NAME));
        Self {
            credentials,
            token_path,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            api_base_url: Self::DEFAULT_API_BASE.to_string(),
            open_browser: false,
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
        }
    }

    /// Sets the token cache path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the Calendar API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Enables or disables opening the browser during authorization.
    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        Ok(())
    }
}
