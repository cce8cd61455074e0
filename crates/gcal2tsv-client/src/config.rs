//! Client configuration.
//!
//! All settings live in a single `config.toml`, looked up in the current
//! directory by default:
//!
//! ```toml
//! [Date]
//! Start = "2024-06-01"
//! End = "2024-06-30"
//!
//! [Output]
//! Filename = "worklog.tsv"
//! Type = "sjis"
//!
//! [GCal]
//! client_secret = "client_secret.json"
//! calender_id = "primary"
//! ```
//!
//! Section and key names are also accepted in lowercase.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gcal2tsv_core::{DEFAULT_PRECISION, DateRange, ExportOptions, TextEncoding};
use gcal2tsv_providers::google::{GoogleConfig, OAuthCredentials, TokenCache};

use crate::error::{ClientError, ClientResult};

/// File name looked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Highest accepted `Output.Precision`.
pub const MAX_PRECISION: usize = 9;

// ---------------------------------------------------------------------------
// AppConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for a gcal2tsv run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Date range to export.
    #[serde(rename = "Date", alias = "date")]
    pub date: DateSettings,

    /// Output file and format.
    #[serde(rename = "Output", alias = "output")]
    pub output: OutputSettings,

    /// Google Calendar settings.
    #[serde(rename = "GCal", alias = "gcal")]
    pub gcal: GCalSettings,
}

/// Date range settings, as `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateSettings {
    /// First day (inclusive).
    #[serde(rename = "Start", alias = "start")]
    pub start: String,

    /// Last boundary (exclusive, midnight).
    #[serde(rename = "End", alias = "end")]
    pub end: String,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Path of the TSV file.
    #[serde(rename = "Filename", alias = "filename")]
    pub filename: PathBuf,

    /// Output variant.
    #[serde(rename = "Type", alias = "type")]
    pub kind: OutputType,

    /// Decimals of the hours column.
    #[serde(rename = "Precision", alias = "precision")]
    pub precision: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            filename: PathBuf::from("worklog.tsv"),
            kind: OutputType::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}

/// What the export step produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputType {
    /// TSV file in Shift_JIS.
    #[default]
    Sjis,
    /// TSV file in UTF-8.
    Utf8,
    /// Print `summary (start - end)` lines; no file.
    Console,
}

impl OutputType {
    /// Returns the configuration name of this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sjis => "sjis",
            Self::Utf8 => "utf8",
            Self::Console => "console",
        }
    }

    /// Returns the file encoding, or `None` for the console variant.
    pub fn encoding(&self) -> Option<TextEncoding> {
        match self {
            Self::Sjis => Some(TextEncoding::ShiftJis),
            Self::Utf8 => Some(TextEncoding::Utf8),
            Self::Console => None,
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("console") {
            return Ok(Self::Console);
        }
        match s.parse::<TextEncoding>() {
            Ok(TextEncoding::ShiftJis) => Ok(Self::Sjis),
            Ok(TextEncoding::Utf8) => Ok(Self::Utf8),
            Err(_) => Err(format!(
                "unknown output type '{}' (expected sjis, utf8 or console)",
                s
            )),
        }
    }
}

impl TryFrom<String> for OutputType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutputType> for String {
    fn from(value: OutputType) -> Self {
        value.as_str().to_string()
    }
}

/// Google Calendar settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GCalSettings {
    /// Path of the OAuth client-secret JSON.
    pub client_secret: PathBuf,

    /// Calendar to export.
    #[serde(rename = "calender_id", alias = "calendar_id")]
    pub calendar_id: String,

    /// Token cache location; `~/.credentials/calendar-gcal2tsv.json` if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_cache: Option<PathBuf>,

    /// Whether to open the consent page in a browser.
    pub open_browser: bool,
}

impl Default for GCalSettings {
    fn default() -> Self {
        Self {
            client_secret: PathBuf::from("client_secret.json"),
            calendar_id: "primary".to_string(),
            token_cache: None,
            open_browser: false,
        }
    }
}

impl AppConfig {
    /// Returns the configuration path used when none is given.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("unable to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| ClientError::Config(format!("unable to parse {}: {}", path.display(), e)))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies command-line overrides.
    pub fn apply_overrides(
        &mut self,
        start: Option<String>,
        end: Option<String>,
        output: Option<PathBuf>,
        kind: Option<OutputType>,
    ) {
        if let Some(start) = start {
            self.date.start = start;
        }
        if let Some(end) = end {
            self.date.end = end;
        }
        if let Some(output) = output {
            self.output.filename = output;
        }
        if let Some(kind) = kind {
            self.output.kind = kind;
        }
    }

    /// Parses the configured date range.
    pub fn date_range(&self) -> ClientResult<DateRange> {
        if self.date.start.trim().is_empty() || self.date.end.trim().is_empty() {
            return Err(ClientError::Config(
                "Date.Start and Date.End are required (YYYY-MM-DD)".to_string(),
            ));
        }
        Ok(DateRange::parse(&self.date.start, &self.date.end)?)
    }

    /// Returns the export options, or `None` for console output.
    pub fn export_options(&self) -> Option<ExportOptions> {
        self.output.kind.encoding().map(|encoding| {
            ExportOptions::default()
                .with_encoding(encoding)
                .with_precision(self.output.precision)
        })
    }

    /// Checks the settings that do not need the filesystem or network.
    pub fn validate(&self) -> ClientResult<()> {
        self.date_range()?;

        if self.output.precision > MAX_PRECISION {
            return Err(ClientError::Config(format!(
                "Output.Precision must be at most {}",
                MAX_PRECISION
            )));
        }

        if self.output.kind != OutputType::Console && self.output.filename.as_os_str().is_empty()
        {
            return Err(ClientError::Config(
                "Output.Filename must not be empty".to_string(),
            ));
        }

        if self.gcal.calendar_id.trim().is_empty() {
            return Err(ClientError::Config(
                "GCal.calender_id must not be empty".to_string(),
            ));
        }

        if self.gcal.client_secret.as_os_str().is_empty() {
            return Err(ClientError::Config(
                "GCal.client_secret must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the token cache path.
    pub fn token_path(&self) -> ClientResult<PathBuf> {
        match self.gcal.token_cache {
            Some(ref path) => Ok(path.clone()),
            None => Ok(TokenCache::default_path()?),
        }
    }

    /// Reads the client-secret file and builds the provider configuration.
    ///
    /// Fails before any network access when the file is missing or malformed.
    pub fn to_provider_config(&self) -> ClientResult<GoogleConfig> {
        let credentials = OAuthCredentials::from_file(&self.gcal.client_secret)?;
        credentials
            .validate()
            .map_err(|e| ClientError::Config(format!("invalid client secret: {}", e)))?;

        let config = GoogleConfig::new(credentials)
            .with_token_path(self.token_path()?)
            .with_open_browser(self.gcal.open_browser);

        config.validate().map_err(ClientError::Config)?;
        Ok(config)
    }
}
