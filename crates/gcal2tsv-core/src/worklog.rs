//! Conversion of calendar events into work-log records.
//!
//! A [`WorkLogRecord`] is one timed calendar event with its duration in
//! hours. All-day events produce no record. Events whose timestamps cannot be
//! parsed are reported through [`TransformError`] instead of being exported
//! with a bogus time.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::event::CalendarEvent;
use crate::time::DATETIME_FORMAT;

/// Default number of decimals used for the duration column.
pub const DEFAULT_PRECISION: usize = 2;

/// Why a timed event could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A timestamp was not valid RFC3339.
    #[error("event '{summary}': invalid {field} timestamp '{value}': {reason}")]
    InvalidTimestamp {
        summary: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The event has a start time but no end time.
    #[error("event '{summary}': missing end timestamp")]
    MissingEnd { summary: String },
}

/// A normalized, timed calendar entry ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLogRecord {
    /// Start time, in the offset reported by the provider.
    pub start: DateTime<FixedOffset>,
    /// End time, in the offset reported by the provider.
    pub end: DateTime<FixedOffset>,
    /// Event title.
    pub summary: String,
    /// `(end - start)` expressed in hours.
    pub duration_hours: f64,
}

impl WorkLogRecord {
    /// Creates a record, computing the duration from the two timestamps.
    pub fn new(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        summary: impl Into<String>,
    ) -> Self {
        let duration_hours = (end - start).num_seconds() as f64 / 3600.0;
        Self {
            start,
            end,
            summary: summary.into(),
            duration_hours,
        }
    }

    /// Returns the start time formatted with [`DATETIME_FORMAT`].
    pub fn start_text(&self) -> String {
        self.start.format(DATETIME_FORMAT).to_string()
    }

    /// Returns the end time formatted with [`DATETIME_FORMAT`].
    pub fn end_text(&self) -> String {
        self.end.format(DATETIME_FORMAT).to_string()
    }

    /// Returns the duration with a fixed number of decimals.
    ///
    /// A negative value that rounds to zero prints without its sign.
    pub fn duration_text(&self, precision: usize) -> String {
        let text = format!("{:.*}", precision, self.duration_hours);
        match text.strip_prefix('-') {
            Some(digits) if digits.chars().all(|c| c == '0' || c == '.') => digits.to_string(),
            _ => text,
        }
    }

    /// Returns the four export columns: start, end, summary, hours.
    pub fn to_fields(&self, precision: usize) -> [String; 4] {
        [
            self.start_text(),
            self.end_text(),
            self.summary.clone(),
            self.duration_text(precision),
        ]
    }
}

fn parse_timestamp(
    summary: &str,
    field: &'static str,
    value: &str,
) -> Result<DateTime<FixedOffset>, TransformError> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|e| TransformError::InvalidTimestamp {
        summary: summary.to_string(),
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Converts one calendar event into a work-log record.
///
/// Returns `Ok(None)` for all-day events.
pub fn to_work_log(event: &CalendarEvent) -> Result<Option<WorkLogRecord>, TransformError> {
    let Some(start) = event.start.time_of_day() else {
        return Ok(None);
    };
    let end = event
        .end
        .time_of_day()
        .ok_or_else(|| TransformError::MissingEnd {
            summary: event.summary.clone(),
        })?;

    let start = parse_timestamp(&event.summary, "start", start)?;
    let end = parse_timestamp(&event.summary, "end", end)?;

    Ok(Some(WorkLogRecord::new(start, end, event.summary.clone())))
}

/// The result of transforming a batch of events.
#[derive(Debug, Default)]
pub struct TransformOutcome {
    /// Records for every timed event, in input order.
    pub records: Vec<WorkLogRecord>,
    /// Timed events that could not be converted.
    pub skipped: Vec<TransformError>,
    /// Number of all-day events left out.
    pub all_day: usize,
}

/// Converts a list of events, reporting every skipped one.
pub fn transform_events(events: &[CalendarEvent]) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();

    for event in events {
        match to_work_log(event) {
            Ok(Some(record)) => {
                if record.end < record.start {
                    warn!(
                        "event '{}' ends before it starts ({} < {})",
                        record.summary,
                        record.end_text(),
                        record.start_text()
                    );
                }
                outcome.records.push(record);
            }
            Ok(None) => {
                debug!("skipping all-day event '{}'", event.summary);
                outcome.all_day += 1;
            }
            Err(e) => {
                warn!("skipping event: {}", e);
                outcome.skipped.push(e);
            }
        }
    }

    debug!(
        "transformed {} events: {} records, {} all-day, {} skipped",
        events.len(),
        outcome.records.len(),
        outcome.all_day,
        outcome.skipped.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTimeSpec;

    fn timed(summary: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent::new(summary, EventTimeSpec::timed(start), EventTimeSpec::timed(end))
    }

    #[test]
    fn canonical_event_row() {
        let event = timed(
            "Design review",
            "2024-06-01T09:00:00+09:00",
            "2024-06-01T17:30:00+09:00",
        );
        let record = to_work_log(&event).unwrap().unwrap();

        assert_eq!(record.duration_hours, 8.5);
        assert_eq!(
            record.to_fields(DEFAULT_PRECISION).join("\t"),
            "2024-06-01 09:00:00\t2024-06-01 17:30:00\tDesign review\t8.50"
        );
    }

    #[test]
    fn keeps_provider_offset() {
        let event = timed("UTC call", "2024-06-01T23:00:00Z", "2024-06-02T00:15:00Z");
        let record = to_work_log(&event).unwrap().unwrap();
        assert_eq!(record.start_text(), "2024-06-01 23:00:00");
        assert_eq!(record.end_text(), "2024-06-02 00:15:00");
        assert_eq!(record.duration_text(2), "1.25");
    }

    #[test]
    fn duration_across_offsets() {
        let event = timed("x", "2024-06-01T09:00:00+09:00", "2024-06-01T01:00:00Z");
        let record = to_work_log(&event).unwrap().unwrap();
        assert_eq!(record.duration_hours, 1.0);
    }

    #[test]
    fn duration_rounds_to_precision() {
        let event = timed("x", "2024-06-01T09:00:00Z", "2024-06-01T09:20:00Z");
        let record = to_work_log(&event).unwrap().unwrap();
        assert_eq!(record.duration_text(2), "0.33");
        assert_eq!(record.duration_text(0), "0");
        assert_eq!(record.duration_text(4), "0.3333");
    }

    #[test]
    fn all_day_event_yields_nothing() {
        let event = CalendarEvent::new(
            "Holiday",
            EventTimeSpec::all_day("2024-06-01"),
            EventTimeSpec::all_day("2024-06-02"),
        );
        assert_eq!(to_work_log(&event).unwrap(), None);
    }

    #[test]
    fn malformed_start_is_an_error() {
        let event = timed("Broken", "2024-06-01 09:00", "2024-06-01T10:00:00Z");
        let err = to_work_log(&event).unwrap_err();
        match err {
            TransformError::InvalidTimestamp { field, value, .. } => {
                assert_eq!(field, "start");
                assert_eq!(value, "2024-06-01 09:00");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_end_is_an_error() {
        let event = CalendarEvent::new(
            "Open ended",
            EventTimeSpec::timed("2024-06-01T09:00:00Z"),
            EventTimeSpec::default(),
        );
        assert_eq!(
            to_work_log(&event).unwrap_err(),
            TransformError::MissingEnd {
                summary: "Open ended".to_string()
            }
        );
    }

    #[test]
    fn transform_reports_skips() {
        let events = vec![
            timed("A", "2024-06-01T09:00:00Z", "2024-06-01T10:00:00Z"),
            CalendarEvent::new(
                "Holiday",
                EventTimeSpec::all_day("2024-06-02"),
                EventTimeSpec::all_day("2024-06-03"),
            ),
            timed("Broken", "not-a-time", "2024-06-01T10:00:00Z"),
            timed("B", "2024-06-04T13:00:00Z", "2024-06-04T15:30:00Z"),
        ];

        let outcome = transform_events(&events);

        let summaries: Vec<_> = outcome.records.iter().map(|r| r.summary.as_str()).collect();
        assert_eq!(summaries, vec!["A", "B"]);
        assert_eq!(outcome.all_day, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].to_string().contains("Broken"));
    }

    #[test]
    fn inverted_event_is_kept_with_negative_duration() {
        let events = vec![timed("Oops", "2024-06-01T10:00:00Z", "2024-06-01T09:00:00Z")];
        let outcome = transform_events(&events);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].duration_text(2), "-1.00");
    }

    #[test]
    fn tiny_inverted_duration_has_no_sign() {
        let event = timed("Blip", "2024-06-01T09:00:10Z", "2024-06-01T09:00:00Z");
        let record = to_work_log(&event).unwrap().unwrap();
        assert!(record.duration_hours < 0.0);
        assert_eq!(record.duration_text(2), "0.00");
        assert_eq!(record.duration_text(0), "0");
        assert_eq!(record.duration_text(4), "-0.0028");
    }
}
