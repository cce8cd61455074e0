//! Tab-separated work-log export.
//!
//! [`TsvExporter`] writes a localized four-column header followed by one row
//! per [`WorkLogRecord`]. Rows are tab-delimited, CRLF-terminated and
//! transcoded to the configured [`TextEncoding`] before they reach the
//! output. The header is always written, so an empty period still yields a
//! valid file.
//!
//! [`export`] encodes the whole file in memory first. The output file is
//! only touched once every row has been encoded, so an encoding error
//! leaves any previous export intact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::encoding::{EncodeError, TextEncoding};
use crate::worklog::{DEFAULT_PRECISION, WorkLogRecord};

/// Header row: start time, end time, work summary, work hours.
pub const HEADER: [&str; 4] = ["開始時刻", "終了時刻", "作業概要", "作業時間"];

/// Errors raised while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output could not be created or written.
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A row could not be formatted as TSV.
    #[error("failed to format row {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },

    /// A row contains text the target encoding cannot represent.
    #[error("line {line}: {source}")]
    Encoding {
        line: usize,
        #[source]
        source: EncodeError,
    },
}

impl ExportError {
    fn io(path: &str, source: io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Returns true if this error comes from the text encoding.
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }
}

/// Options controlling the export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Encoding of the output bytes.
    pub encoding: TextEncoding,
    /// Decimals of the hours column.
    pub precision: usize,
    /// Whether rows are echoed once the file has been written.
    pub echo: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::default(),
            precision: DEFAULT_PRECISION,
            echo: true,
        }
    }
}

impl ExportOptions {
    /// Builder method to set the output encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Builder method to set the hours precision.
    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder method to toggle the row echo.
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// The file written, if any.
    pub path: Option<PathBuf>,
    /// Number of data rows (header excluded).
    pub rows: usize,
    /// Number of bytes written, header included.
    pub bytes: usize,
}

/// Streaming TSV writer over any [`Write`] sink.
#[derive(Debug)]
pub struct TsvExporter<W: Write> {
    out: W,
    options: ExportOptions,
    lines: usize,
    bytes: usize,
}

impl<W: Write> TsvExporter<W> {
    /// Creates an exporter writing to `out`.
    pub fn new(out: W, options: ExportOptions) -> Self {
        Self {
            out,
            options,
            lines: 0,
            bytes: 0,
        }
    }

    /// Writes the header row.
    pub fn write_header(&mut self) -> Result<(), ExportError> {
        self.write_fields(&HEADER)
    }

    /// Writes one record.
    pub fn write_record(&mut self, record: &WorkLogRecord) -> Result<(), ExportError> {
        self.write_fields(&record.to_fields(self.options.precision))
    }

    fn write_fields<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<(), ExportError> {
        let line = self.lines + 1;
        let text = format_line(fields).map_err(|source| ExportError::Csv { line, source })?;
        let bytes = self
            .options
            .encoding
            .encode(&text)
            .map_err(|source| ExportError::Encoding { line, source })?;

        self.out
            .write_all(&bytes)
            .map_err(|e| ExportError::io("<output>", e))?;
        self.lines = line;
        self.bytes += bytes.len();
        Ok(())
    }

    /// Flushes the sink and returns it with the number of bytes written.
    pub fn finish(mut self) -> Result<(W, usize), ExportError> {
        self.out
            .flush()
            .map_err(|e| ExportError::io("<output>", e))?;
        Ok((self.out, self.bytes))
    }
}

/// Formats one TSV line, CRLF included.
fn format_line<S: AsRef<str>>(fields: &[S]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(fields.iter().map(|f| f.as_ref()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Writes `records` to `out` with a header.
pub fn export_to_writer<W: Write>(
    records: &[WorkLogRecord],
    out: W,
    options: ExportOptions,
) -> Result<(W, usize), ExportError> {
    let mut exporter = TsvExporter::new(out, options);
    exporter.write_header()?;
    for record in records {
        exporter.write_record(record)?;
    }
    exporter.finish()
}

/// Writes `records` to the file at `path`, replacing its content.
///
/// When `options.echo` is set, each row is then written tab-joined to `echo`.
pub fn export<E: Write>(
    records: &[WorkLogRecord],
    path: &Path,
    options: ExportOptions,
    echo: &mut E,
) -> Result<ExportSummary, ExportError> {
    let (buffer, bytes) = export_to_writer(records, Vec::new(), options)?;
    debug!("encoded {} rows as {}", records.len(), options.encoding);

    let label = path.display().to_string();
    fs::write(path, &buffer).map_err(|e| ExportError::io(&label, e))?;

    if options.echo {
        for record in records {
            writeln!(echo, "{}", record.to_fields(options.precision).join("\t"))
                .map_err(|e| ExportError::io("<echo>", e))?;
        }
        echo.flush().map_err(|e| ExportError::io("<echo>", e))?;
    }

    info!(
        "wrote {} rows ({} bytes, {}) to {}",
        records.len(),
        bytes,
        options.encoding,
        path.display()
    );
    Ok(ExportSummary {
        path: Some(path.to_path_buf()),
        rows: records.len(),
        bytes,
    })
}

/// Formats a record for the console listing: `summary (start - end)`.
pub fn console_line(record: &WorkLogRecord) -> String {
    format!(
        "{} ({} - {})",
        record.summary,
        record.start_text(),
        record.end_text()
    )
}

/// Prints records to `out` in the console format instead of writing a file.
pub fn print_console<W: Write>(records: &[WorkLogRecord], mut out: W) -> io::Result<ExportSummary> {
    if records.is_empty() {
        writeln!(out, "No upcoming events found.")?;
    }
    for record in records {
        writeln!(out, "{}", console_line(record))?;
    }
    out.flush()?;
    Ok(ExportSummary {
        path: None,
        rows: records.len(),
        bytes: 0,
    })
}
