//! Client error types.

use gcal2tsv_core::{DateRangeError, ExportError};
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that abort a `gcal2tsv` run.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration or client-secret file is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
    /// The OAuth exchange failed or the API rejected the credentials.
    #[error("authorization failed: {0}")]
    Authorization(String),
    /// The Calendar API could not be reached or answered unexpectedly.
    #[error("calendar request failed: {0}")]
    Transport(String),
    /// A row could not be represented in the output encoding.
    #[error("encoding error: {0}")]
    Encoding(String),
    /// Local file or console I/O failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<DateRangeError> for ClientError {
    fn from(err: DateRangeError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ExportError> for ClientError {
    fn from(err: ExportError) -> Self {
        if err.is_encoding() {
            Self::Encoding(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

impl From<gcal2tsv_providers::ProviderError> for ClientError {
    fn from(err: gcal2tsv_providers::ProviderError) -> Self {
        use gcal2tsv_providers::ProviderErrorCode;

        match err.code() {
            code if code.is_auth() => Self::Authorization(err.message().to_string()),
            ProviderErrorCode::ConfigurationError => Self::Config(err.message().to_string()),
            ProviderErrorCode::IoError => Self::Io(err.message().to_string()),
            _ => Self::Transport(err.to_string()),
        }
    }
}
