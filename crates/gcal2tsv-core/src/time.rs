//! Date and time helpers for the export window.
//!
//! This module provides the named format descriptors used when parsing
//! configuration dates and printing work-log timestamps, and [`DateRange`]
//! for turning the configured dates into the query window sent to the
//! calendar provider.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format of a calendar date in the configuration file (`2024-06-01`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of a timestamp in the exported work log (`2024-06-01 09:00:00`).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors produced when building a [`DateRange`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    /// A date string did not match [`DATE_FORMAT`].
    #[error("invalid date '{value}' (expected YYYY-MM-DD): {reason}")]
    InvalidDate { value: String, reason: String },

    /// The end date lies before the start date.
    #[error("end date {end} is before start date {start}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Parses a configuration date using [`DATE_FORMAT`].
pub fn parse_date(value: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        DateRangeError::InvalidDate {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

/// The configured export period.
///
/// Both dates are interpreted as midnight UTC, which is what the calendar
/// query receives as `timeMin` and `timeMax`. The provider's own boundary
/// semantics apply unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the period.
    pub start: NaiveDate,
    /// Last boundary of the period.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new range, rejecting an end before the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end < start {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses both boundaries with [`DATE_FORMAT`].
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Returns the query window sent to the provider.
    pub fn to_window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start.and_time(chrono::NaiveTime::MIN).and_utc(),
            end: self.end.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "start={}, end={}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// A time window for querying calendar events, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Lower bound (`timeMin`).
    pub start: DateTime<Utc>,
    /// Upper bound (`timeMax`).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window from two instants.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}
