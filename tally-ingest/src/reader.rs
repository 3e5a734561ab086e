//! File-level driver: detect the layout, run the row parser over every record,
//! keep the good rows in file order and account for the rest.

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tally_core::{CsvFormat, IngestError, RowError, Transaction};
use tracing::{debug, info, warn};

use crate::detect::{detect_format, DETECTION_SAMPLE_CHARS};
use crate::parsers::parse_row;

/// Row failures kept verbatim for display
pub const MAX_ERROR_SAMPLES: usize = 5;

/// What happened to the rows that did not become transactions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    /// Records read from the file
    pub rows_read: usize,
    /// Rows that are not transactions (short, blank, headers)
    pub skipped: usize,
    /// Transaction-shaped rows whose fields did not convert
    pub failed: usize,
    /// First few failures, `line N: message`
    pub samples: Vec<String>,
}

impl ParseDiagnostics {
    fn record_failure(&mut self, line: u64, err: &RowError) {
        self.failed += 1;
        if self.samples.len() < MAX_ERROR_SAMPLES {
            self.samples.push(format!("line {line}: {err}"));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedStatement {
    pub format: CsvFormat,
    pub transactions: Vec<Transaction>,
    pub diagnostics: ParseDiagnostics,
}

/// Read and parse a statement file.
///
/// Fails only when the file can't be read or yields no transactions at all.
/// Records that are not valid UTF-8 count as failed rows.
pub fn parse_csv_file(path: impl AsRef<Path>) -> Result<ParsedStatement, IngestError> {
    let path = path.as_ref();
    let content = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "read statement");
    parse_csv_bytes(&content)
}

/// Parse statement content already in memory.
pub fn parse_csv_str(content: &str) -> Result<ParsedStatement, IngestError> {
    parse_csv_bytes(content.as_bytes())
}

/// Parse raw statement bytes; invalid UTF-8 is only fatal to the record holding it.
pub fn parse_csv_bytes(content: &[u8]) -> Result<ParsedStatement, IngestError> {
    // Enough bytes to hold the detection sample even if every char is 4 bytes wide
    let head = &content[..content.len().min(DETECTION_SAMPLE_CHARS * 4)];
    let format = detect_format(&String::from_utf8_lossy(head));
    info!(%format, "detected csv format");

    let parsed = parse_byte_records(format, content);
    if parsed.transactions.is_empty() {
        warn!(%format, rows = parsed.diagnostics.rows_read, "no transactions found");
        return Err(IngestError::NoTransactions { format });
    }
    Ok(parsed)
}

/// Run the `format` row parser over `content`. Never fails; may return no rows.
pub fn parse_records(format: CsvFormat, content: &str) -> ParsedStatement {
    parse_byte_records(format, content.as_bytes())
}

fn parse_byte_records(format: CsvFormat, content: &[u8]) -> ParsedStatement {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(content);

    let mut transactions = Vec::new();
    let mut diagnostics = ParseDiagnostics::default();
    let mut record = StringRecord::new();

    loop {
        let line = rdr.position().line();
        match rdr.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) => {
                diagnostics.rows_read += 1;
                let err = RowError::Record(e.to_string());
                warn!(line, %format, error = %err, "skipping unreadable record");
                diagnostics.record_failure(line, &err);
                continue;
            }
        }
        diagnostics.rows_read += 1;
        let line = record.position().map(|p| p.line()).unwrap_or(line);

        match parse_row(format, &record) {
            Ok(Some(txn)) => transactions.push(txn),
            Ok(None) => {
                debug!(line, %format, "skipping non-transaction row");
                diagnostics.skipped += 1;
            }
            Err(err) => {
                warn!(line, %format, error = %err, "skipping malformed row");
                diagnostics.record_failure(line, &err);
            }
        }
    }

    info!(
        %format,
        parsed = transactions.len(),
        skipped = diagnostics.skipped,
        failed = diagnostics.failed,
        "parsed transactions"
    );

    ParsedStatement {
        format,
        transactions,
        diagnostics,
    }
}
