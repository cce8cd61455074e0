//! EventSource trait definition.
//!
//! This module defines the [`EventSource`] trait, the seam between the
//! export pipeline and a calendar backend. The Google Calendar client
//! implements it; tests substitute a fixed list of events.

use std::future::Future;
use std::pin::Pin;

use gcal2tsv_core::{CalendarEvent, TimeWindow};

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A source of calendar events.
///
/// # Implementation Notes
///
/// - Recurring events must already be expanded into single instances
/// - Events are returned ordered by start time
/// - Events are returned as the backend sent them; no filtering
pub trait EventSource: Send + Sync {
    /// Returns the name of this source (e.g., "google").
    fn name(&self) -> &str;

    /// Lists the events of one calendar that overlap `window`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network errors, authentication failures,
    /// unexpected responses, etc.
    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>>;
}

/// An event source backed by a fixed list of events.
///
/// Returns every event regardless of calendar or window.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    events: Vec<CalendarEvent>,
}

impl StaticSource {
    /// Creates a source returning the given events.
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }
}

impl EventSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn list_events<'a>(
        &'a self,
        _calendar_id: &'a str,
        _window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
        let events = self.events.clone();
        Box::pin(async move { Ok(events) })
    }
}

/// A source that always returns an error.
///
/// Useful for testing error propagation.
#[derive(Debug)]
pub struct ErrorSource {
    name: String,
    error: ProviderError,
}

impl ErrorSource {
    /// Creates a new error source.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl EventSource for ErrorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_events<'a>(
        &'a self,
        _calendar_id: &'a str,
        _window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
        // ProviderError is not Clone; rebuild it from its parts.
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::{Duration, Utc};
    use gcal2tsv_core::EventTimeSpec;

    fn window() -> TimeWindow {
        let now = Utc::now();
        TimeWindow::new(now, now + Duration::days(1))
    }

    #[tokio::test]
    async fn static_source_returns_events() {
        let event = CalendarEvent::new(
            "Standup",
            EventTimeSpec::timed("2024-06-03T09:00:00+09:00"),
            EventTimeSpec::timed("2024-06-03T09:15:00+09:00"),
        );
        let source = StaticSource::new(vec![event.clone()]);

        assert_eq!(source.name(), "static");
        let events = source.list_events("primary", window()).await.unwrap();
        assert_eq!(events, vec![event]);
    }

    #[tokio::test]
    async fn error_source_returns_error() {
        let source = ErrorSource::new("test", ProviderError::authorization("denied"));

        assert_eq!(source.name(), "test");
        let err = source.list_events("primary", window()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthorizationFailed);
        assert_eq!(err.provider(), Some("test"));
    }
}
