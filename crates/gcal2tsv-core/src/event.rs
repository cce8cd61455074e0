//! Calendar event types as returned by a provider.
//!
//! [`CalendarEvent`] keeps the provider's start/end strings untouched; the
//! work-log transformer in [`crate::worklog`] is the only place that parses
//! them.

use serde::{Deserialize, Serialize};

/// The start or end of a calendar event, as the provider sent it.
///
/// Timed events carry `date_time` (RFC3339). All-day events carry only `date`
/// (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTimeSpec {
    /// Date of an all-day event.
    pub date: Option<String>,
    /// RFC3339 timestamp of a timed event.
    pub date_time: Option<String>,
    /// IANA timezone the event was created in, if reported.
    pub time_zone: Option<String>,
}

impl EventTimeSpec {
    /// Creates a timed specification from an RFC3339 string.
    pub fn timed(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            ..Self::default()
        }
    }

    /// Creates an all-day specification from a `YYYY-MM-DD` string.
    pub fn all_day(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    /// Returns the timestamp when it is present and non-empty.
    pub fn time_of_day(&self) -> Option<&str> {
        self.date_time.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Returns true if there is no time-of-day component.
    pub fn is_all_day(&self) -> bool {
        self.time_of_day().is_none()
    }
}

/// A single calendar event instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Provider identifier, when known.
    pub id: Option<String>,
    /// Event title. Empty when the provider sent none.
    pub summary: String,
    /// When the event starts.
    pub start: EventTimeSpec,
    /// When the event ends.
    pub end: EventTimeSpec,
}

impl CalendarEvent {
    /// Creates an event with the given summary and times.
    pub fn new(summary: impl Into<String>, start: EventTimeSpec, end: EventTimeSpec) -> Self {
        Self {
            id: None,
            summary: summary.into(),
            start,
            end,
        }
    }

    /// Builder method to set the provider identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns true if this is an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_event_is_not_all_day() {
        let event = CalendarEvent::new(
            "Standup",
            EventTimeSpec::timed("2024-06-01T09:00:00+09:00"),
            EventTimeSpec::timed("2024-06-01T09:15:00+09:00"),
        );
        assert!(!event.is_all_day());
        assert_eq!(event.start.time_of_day(), Some("2024-06-01T09:00:00+09:00"));
    }

    #[test]
    fn date_only_event_is_all_day() {
        let event = CalendarEvent::new(
            "Holiday",
            EventTimeSpec::all_day("2024-06-01"),
            EventTimeSpec::all_day("2024-06-02"),
        );
        assert!(event.is_all_day());
    }

    #[test]
    fn empty_date_time_counts_as_all_day() {
        let spec = EventTimeSpec {
            date_time: Some(String::new()),
            ..EventTimeSpec::default()
        };
        assert!(spec.is_all_day());
        assert!(spec.time_of_day().is_none());
    }

    #[test]
    fn with_id_sets_identifier() {
        let event = CalendarEvent::new("x", EventTimeSpec::default(), EventTimeSpec::default())
            .with_id("evt-1");
        assert_eq!(event.id.as_deref(), Some("evt-1"));
    }

    #[test]
    fn serde_roundtrip() {
        let event = CalendarEvent::new(
            "Design review",
            EventTimeSpec::timed("2024-06-01T09:00:00+09:00"),
            EventTimeSpec::timed("2024-06-01T17:30:00+09:00"),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: CalendarEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
