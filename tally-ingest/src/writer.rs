//! Write normalized transactions back out in the simple five-column layout.
//!
//! Output re-parses with the simple parser to the same number of rows. Read it
//! back with `parse_records(CsvFormat::Simple, ..)`: a description quoting the
//! Desjardins bank name would otherwise steer format detection.

use csv::WriterBuilder;
use std::io::Write;
use tally_core::{IngestError, Transaction, TransactionDate};

use crate::parsers::simple::DATE_FORMAT;

pub fn write_simple_csv<W: Write>(w: W, txns: &[Transaction]) -> Result<(), IngestError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(w);

    for t in txns {
        let date = match &t.date {
            TransactionDate::Parsed(dt) => dt.format(DATE_FORMAT).to_string(),
            TransactionDate::Raw(raw) => raw.clone(),
        };
        let debit = if t.debit.is_zero() { String::new() } else { t.debit.to_string() };
        let credit = if t.credit.is_zero() { String::new() } else { t.credit.to_string() };
        let balance = t.balance.to_string();

        wtr.write_record([
            date.as_str(),
            t.description.as_str(),
            debit.as_str(),
            credit.as_str(),
            balance.as_str(),
        ])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
