//! Google Calendar backend.
//!
//! # Authentication Flow
//!
//! 1. The user downloads an OAuth client secret for a desktop application
//! 2. On the first run the consent URL is printed (and optionally opened)
//! 3. The user pastes the authorization code back into the terminal
//! 4. The code is exchanged for access and refresh tokens
//! 5. Tokens are cached under `~/.credentials/` and refreshed when expired
//!
//! # Example
//!
//! ```ignore
//! use gcal2tsv_providers::google::{authorize, GoogleConfig, OAuthCredentials};
//!
//! let credentials = OAuthCredentials::from_file("client_secret.json")?;
//! let config = GoogleConfig::new(credentials);
//!
//! let stdin = std::io::stdin();
//! let mut client = authorize(&config, &mut stdin.lock(), &mut std::io::stdout(), false).await?;
//! let calendar = client.calendar_client(&config).await?;
//! let events = calendar.fetch_events("primary", start, end).await?;
//! ```

mod auth;
mod client;
mod config;
mod oauth;
mod tokens;

pub use auth::{AuthorizedClient, authorize};
pub use client::GoogleCalendarClient;
pub use config::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GoogleConfig, OAuthCredentials, OOB_REDIRECT_URI};
pub use oauth::{OAuthClient, STATE_TOKEN};
pub use tokens::{TOKEN_DIR, TOKEN_FILE_NAME, TokenCache, TokenInfo};
