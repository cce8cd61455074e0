//! Core types: calendar events, work-log records, TSV export, encodings

pub mod encoding;
pub mod event;
pub mod export;
pub mod time;
pub mod tracing;
pub mod worklog;

pub use encoding::{EncodeError, TextEncoding};
pub use event::{CalendarEvent, EventTimeSpec};
pub use export::{
    ExportError, ExportOptions, ExportSummary, HEADER, TsvExporter, console_line, export,
    export_to_writer, print_console,
};
pub use time::{DATE_FORMAT, DATETIME_FORMAT, DateRange, DateRangeError, TimeWindow, parse_date};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use worklog::{
    DEFAULT_PRECISION, TransformError, TransformOutcome, WorkLogRecord, to_work_log,
    transform_events,
};
