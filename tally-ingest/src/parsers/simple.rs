//! Simple five-column statement parser
//!
//! Expected rows (no header required):
//!   01/15/2024,Grocery Store,45.20,,1000.00
//!   01/16/2024,Paycheck,,2000.00,2954.80
//!
//! Columns: date (MM/DD/YYYY), description, debit, credit, balance.

use csv::StringRecord;
use tally_core::{Transaction, TransactionDate};

use super::{field, parse_amount, parse_flow_amount, RowResult};

pub const MIN_COLUMNS: usize = 5;
pub const DATE_FORMAT: &str = "%m/%d/%Y";

pub fn parse_simple_row(record: &StringRecord) -> RowResult {
    if record.len() < MIN_COLUMNS {
        return Ok(None);
    }

    let date_raw = field(record, 0);
    if date_raw.is_empty() {
        return Ok(None);
    }

    let debit = parse_flow_amount("debit", field(record, 2))?;
    let credit = parse_flow_amount("credit", field(record, 3))?;
    let balance = parse_amount("balance", field(record, 4))?;

    Ok(Some(Transaction::new(
        TransactionDate::parse_or_raw(date_raw, DATE_FORMAT),
        field(record, 1),
        debit,
        credit,
        balance,
    )))
}
