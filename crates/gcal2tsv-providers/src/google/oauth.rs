//! OAuth 2.0 authorization code flow for installed applications.
//!
//! The user opens the authorization URL, grants read-only calendar access,
//! and pastes the code Google shows back into the terminal. The code is then
//! exchanged at the token endpoint for an access token and a refresh token.
//!
//! # Flow Overview
//!
//! 1. Build the authorization URL with `access_type=offline`
//! 2. The user visits it and copies the authorization code
//! 3. Exchange the code for tokens
//! 4. Later runs refresh the access token with the refresh token

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

use super::config::OAuthCredentials;
use super::tokens::TokenInfo;

/// Fixed `state` value sent with the authorization request.
///
/// The code is pasted by hand, so there is no redirect to check it against.
pub const STATE_TOKEN: &str = "state-token";

/// OAuth client for Google APIs.
///
/// Builds the consent URL and talks to the token endpoint.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client with the given credentials.
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            credentials,
            http_client,
        })
    }

    /// Builds the URL the user visits to grant access.
    pub fn auth_url(&self, scopes: &[String]) -> ProviderResult<String> {
        let scope = scopes.join(" ");
        let url = Url::parse_with_params(
            &self.credentials.auth_uri,
            &[
                ("access_type", "offline"),
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("state", STATE_TOKEN),
            ],
        )
        .map_err(|e| {
            ProviderError::configuration(format!(
                "invalid auth_uri {:?}: {}",
                self.credentials.auth_uri, e
            ))
        })?;

        Ok(url.into())
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> ProviderResult<TokenInfo> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ];

        let response = self.post_token(&params, "token exchange").await?;
        info!("successfully obtained tokens");
        Ok(TokenInfo::new(
            response.access_token,
            response.token_type,
            response.refresh_token,
            response.expires_in,
        ))
    }

    /// Refreshes an expired access token using the refresh token.
    ///
    /// Google normally omits the refresh token from refresh responses, in
    /// which case the one passed in is kept.
    pub async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<TokenInfo> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self.post_token(&params, "token refresh").await?;
        info!("successfully refreshed access token");
        Ok(TokenInfo::new(
            response.access_token,
            response.token_type,
            response
                .refresh_token
                .filter(|t| !t.is_empty())
                .or_else(|| Some(refresh_token.to_string())),
            response.expires_in,
        ))
    }

    async fn post_token(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<TokenResponse> {
        debug!("POST {} ({})", self.credentials.token_uri, what);

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("{} request failed: {}", what, e)).with_source(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(ProviderError::authentication(format!(
                "{} failed ({}): {}",
                what, status, detail
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
        })
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::google::GoogleConfig;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OAuthClient {
        let credentials = OAuthCredentials::new("test-client.apps.googleusercontent.com", "s3cret")
            .with_endpoints(
                "https://accounts.example.com/o/oauth2/auth",
                format!("{}/token", server.uri()),
            );
        OAuthClient::new(credentials, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn auth_url_format() {
        let credentials = OAuthCredentials::new("test-client.apps.googleusercontent.com", "s3cret");
        let client = OAuthClient::new(credentials, Duration::from_secs(5)).unwrap();
        let url = client
            .auth_url(&[GoogleConfig::DEFAULT_SCOPE.to_string()])
            .unwrap();

        let parsed = Url::parse(&url).unwrap();
        assert_eq!(
            format!("{}://{}{}", parsed.scheme(), parsed.host_str().unwrap(), parsed.path()),
            "https://accounts.google.com/o/oauth2/auth"
        );
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("client_id"), Some("test-client.apps.googleusercontent.com"));
        assert_eq!(get("redirect_uri"), Some("urn:ietf:wg:oauth:2.0:oob"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("scope"), Some(GoogleConfig::DEFAULT_SCOPE));
        assert_eq!(get("state"), Some(STATE_TOKEN));
        assert_eq!(get("access_type"), Some("offline"));
    }

    #[test]
    fn auth_url_rejects_bad_endpoint() {
        let credentials = OAuthCredentials::new("id", "secret").with_endpoints("not a url", "x");
        let client = OAuthClient::new(credentials, Duration::from_secs(5)).unwrap();
        let err = client.auth_url(&[]).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[tokio::test]
    async fn exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=4%2Fabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.new",
                "expires_in": 3599,
                "refresh_token": "1//refresh",
                "scope": "https://www.googleapis.com/auth/calendar.readonly",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server).exchange_code("4/abc").await.unwrap();
        assert_eq!(token.access_token, "ya29.new");
        assert_eq!(token.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(token.token_type, "Bearer");
        assert!(!token.is_expired());
    }

    #[tokio::test]
    async fn exchange_code_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Malformed auth code."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).exchange_code("bogus").await.unwrap_err();
        assert!(err.code().is_auth());
        assert!(err.message().contains("invalid_grant"));
        assert!(err.message().contains("Malformed auth code."));
    }

    #[tokio::test]
    async fn refresh_keeps_existing_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.refreshed",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let token = client_for(&server).refresh_token("1//keep").await.unwrap();
        assert_eq!(token.access_token, "ya29.refreshed");
        assert_eq!(token.refresh_token.as_deref(), Some("1//keep"));
    }

    #[tokio::test]
    async fn refresh_with_garbage_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).refresh_token("1//r").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }
}
