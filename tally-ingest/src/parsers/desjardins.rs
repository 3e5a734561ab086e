//! Desjardins account export parser
//!
//! Rows are fully quoted and positional:
//!   "Desjardins Ontario","00001","EOP","2024/01/15","00042","Paiement facture","","45.20","","","","","","954.80"
//!
//! Used columns: bank (0), date (3, YYYY/MM/DD), transaction id (4),
//! description (5), withdrawal (7), deposit (8), balance (last).

use csv::StringRecord;
use rust_decimal::Decimal;
use tally_core::{Transaction, TransactionDate};
use tracing::debug;

use super::{field, parse_amount, parse_flow_amount, RowResult};

pub const MIN_COLUMNS: usize = 8;
pub const DATE_FORMAT: &str = "%Y/%m/%d";
/// Date cell of the export's header line
pub const HEADER_MARKER: &str = "PCA";

const BANK_COL: usize = 0;
const DATE_COL: usize = 3;
const TRANSACTION_ID_COL: usize = 4;
const DESCRIPTION_COL: usize = 5;
const DEBIT_COL: usize = 7;
const CREDIT_COL: usize = 8;

pub fn parse_desjardins_row(record: &StringRecord) -> RowResult {
    if record.len() < MIN_COLUMNS {
        return Ok(None);
    }

    let bank = field(record, BANK_COL);
    let date_raw = field(record, DATE_COL);
    if date_raw.is_empty() || date_raw == HEADER_MARKER || bank.is_empty() {
        return Ok(None);
    }

    let balance = parse_amount("balance", field(record, record.len() - 1))?;
    let debit = optional_amount(record, DEBIT_COL, "debit")?;
    let credit = optional_amount(record, CREDIT_COL, "credit")?;

    // The export fills one of the two columns; both being set is kept as-is.
    if !debit.is_zero() && !credit.is_zero() {
        debug!(%debit, %credit, "desjardins row has both withdrawal and deposit");
    }

    let date = if date_raw.contains('/') {
        TransactionDate::parse_or_raw(date_raw, DATE_FORMAT)
    } else {
        TransactionDate::Raw(date_raw.to_string())
    };

    Ok(Some(
        Transaction::new(date, field(record, DESCRIPTION_COL), debit, credit, balance)
            .with_source(bank, field(record, TRANSACTION_ID_COL)),
    ))
}

fn optional_amount(record: &StringRecord, idx: usize, name: &'static str) -> Result<Decimal, tally_core::RowError> {
    match record.get(idx).map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_flow_amount(name, raw),
        _ => Ok(Decimal::ZERO),
    }
}
