//! Error types for statement ingestion.

use std::path::PathBuf;
use thiserror::Error;

use crate::transaction::CsvFormat;

/// File-level failures. Individual bad rows never surface here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Every row was skipped or rejected
    #[error("No valid transactions found in the CSV file.")]
    NoTransactions { format: CsvFormat },
}

/// Why a single well-shaped row could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("invalid {field} amount: {value:?}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("{field} amount out of range: {value}")]
    AmountOutOfRange { field: &'static str, value: String },

    #[error("unreadable record: {0}")]
    Record(String),
}
