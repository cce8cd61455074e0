//! Google Calendar API client.
//!
//! A thin HTTP client for the `events.list` endpoint of the Calendar API v3.
//! Recurring events are expanded server-side and ordered by start time.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use gcal2tsv_core::{CalendarEvent, EventTimeSpec, TimeWindow};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, EventSource};

use super::config::GoogleConfig;

/// Google Calendar API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarClient {
    /// Creates a new Google Calendar client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            base_url: GoogleConfig::DEFAULT_API_BASE.to_string(),
            access_token: access_token.into(),
        })
    }

    /// Creates a client using the timeout and base URL of `config`.
    pub fn from_config(
        access_token: impl Into<String>,
        config: &GoogleConfig,
    ) -> ProviderResult<Self> {
        Ok(Self::new(access_token, config.timeout)?.with_base_url(&config.api_base_url))
    }

    /// Builder method to point the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Lists the events of `calendar_id` between `time_min` and `time_max`.
    ///
    /// Only the first page of results is read.
    pub async fn fetch_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );

        debug!(
            "GET {} timeMin={} timeMax={}",
            url,
            time_min.to_rfc3339(),
            time_max.to_rfc3339()
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network("request timeout")
                } else if e.is_connect() {
                    ProviderError::network(format!("connection failed: {}", e))
                } else {
                    ProviderError::network(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = api_error_message(&body).unwrap_or(body);
            return Err(match status {
                reqwest::StatusCode::UNAUTHORIZED => ProviderError::authentication(format!(
                    "access token expired or invalid: {}",
                    detail
                )),
                reqwest::StatusCode::FORBIDDEN => ProviderError::authorization(format!(
                    "access denied to calendar {}: {}",
                    calendar_id, detail
                )),
                reqwest::StatusCode::NOT_FOUND => {
                    ProviderError::not_found(format!("calendar {} not found", calendar_id))
                }
                _ => ProviderError::server(format!("API error ({}): {}", status, detail)),
            });
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e))
        })?;

        let list: EventListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        })?;

        if list.next_page_token.is_some() {
            debug!("calendar {} has more pages; only the first is read", calendar_id);
        }

        let events: Vec<CalendarEvent> = list.items.into_iter().map(CalendarEvent::from).collect();
        debug!("fetched {} events from calendar {}", events.len(), calendar_id);
        Ok(events)
    }
}

impl EventSource for GoogleCalendarClient {
    fn name(&self) -> &str {
        "google"
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
        Box::pin(async move {
            self.fetch_events(calendar_id, window.start, window.end)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }
}

/// Extracts `error.message` from a Google API error body.
fn api_error_message(body: &str) -> Option<String> {
    let parsed: ApiErrorResponse = serde_json::from_str(body).ok()?;
    parsed.error.message
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// A single event from the Google Calendar API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    start: ApiEventTime,
    #[serde(default)]
    end: ApiEventTime,
}

/// Event time from the API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

impl From<ApiEventTime> for EventTimeSpec {
    fn from(time: ApiEventTime) -> Self {
        Self {
            date: time.date,
            date_time: time.date_time,
            time_zone: time.time_zone,
        }
    }
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        Self {
            id: event.id,
            summary: event.summary.unwrap_or_default(),
            start: event.start.into(),
            end: event.end.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::TimeZone;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap(),
        )
    }

    fn client_for(server: &MockServer) -> GoogleCalendarClient {
        GoogleCalendarClient::new("ya29.token", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[test]
    fn parse_event_list_response() {
        let json = r#"{
            "kind": "calendar#events",
            "items": [
                {
                    "id": "event1",
                    "summary": "Test Meeting",
                    "start": {
                        "dateTime": "2024-03-15T10:00:00+09:00",
                        "timeZone": "Asia/Tokyo"
                    },
                    "end": {
                        "dateTime": "2024-03-15T11:00:00+09:00"
                    },
                    "status": "confirmed"
                }
            ]
        }"#;

        let response: EventListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 1);
        let event = CalendarEvent::from(response.items.into_iter().next().unwrap());
        assert_eq!(event.id.as_deref(), Some("event1"));
        assert_eq!(event.summary, "Test Meeting");
        assert_eq!(event.start.date_time.as_deref(), Some("2024-03-15T10:00:00+09:00"));
        assert_eq!(event.start.time_zone.as_deref(), Some("Asia/Tokyo"));
    }

    #[test]
    fn parse_all_day_event() {
        let json = r#"{
            "id": "event1",
            "summary": "All Day Event",
            "start": { "date": "2024-03-15" },
            "end": { "date": "2024-03-16" }
        }"#;

        let event = CalendarEvent::from(serde_json::from_str::<ApiEvent>(json).unwrap());
        assert_eq!(event.start.date.as_deref(), Some("2024-03-15"));
        assert!(event.is_all_day());
    }

    #[test]
    fn missing_summary_becomes_empty() {
        let json = r#"{ "start": { "dateTime": "2024-03-15T10:00:00Z" } }"#;
        let event = CalendarEvent::from(serde_json::from_str::<ApiEvent>(json).unwrap());
        assert_eq!(event.summary, "");
        assert_eq!(event.end, EventTimeSpec::default());
    }

    #[tokio::test]
    async fn list_events_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer ya29.token"))
            .and(query_param("timeMin", "2024-06-01T00:00:00Z"))
            .and(query_param("timeMax", "2024-06-30T00:00:00Z"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "id": "a",
                        "summary": "Design review",
                        "start": { "dateTime": "2024-06-03T10:00:00+09:00" },
                        "end": { "dateTime": "2024-06-03T11:30:00+09:00" }
                    },
                    {
                        "id": "b",
                        "summary": "Holiday",
                        "start": { "date": "2024-06-04" },
                        "end": { "date": "2024-06-05" }
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let events = EventSource::list_events(&client, "primary", window()).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary, "Design review");
        assert!(events[1].is_all_day());
    }

    #[tokio::test]
    async fn list_events_escapes_calendar_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/user%40example.com/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let events = client_for(&server)
            .fetch_events("user@example.com", window().start, window().end)
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn list_events_maps_status_codes() {
        let cases = [
            (401, ProviderErrorCode::AuthenticationFailed),
            (403, ProviderErrorCode::AuthorizationFailed),
            (404, ProviderErrorCode::NotFound),
            (500, ProviderErrorCode::ServerError),
        ];

        for (status, code) in cases {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                    "error": { "code": status, "message": "nope" }
                })))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .fetch_events("primary", window().start, window().end)
                .await
                .unwrap_err();
            assert_eq!(err.code(), code, "status {}", status);
        }
    }

    #[tokio::test]
    async fn list_events_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_events("primary", window().start, window().end)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let client = GoogleCalendarClient::new("t", Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = client
            .fetch_events("primary", window().start, window().end)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NetworkError);
    }
}
