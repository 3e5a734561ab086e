//! tally-core: canonical transaction types, summary shapes and errors shared by the tally crates

pub mod error;
pub mod summary;
pub mod transaction;

pub use error::{IngestError, RowError};
pub use summary::{DateRange, DescriptionCount, MonthlyTotals, Summary, SummaryStats};
pub use transaction::{CsvFormat, Transaction, TransactionDate, ISO_DATETIME_FORMAT};
