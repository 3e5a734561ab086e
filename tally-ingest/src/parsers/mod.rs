//! Row parsers, one per supported layout.
//!
//! Every parser maps a single CSV record to:
//! - `Ok(Some(txn))` for a usable row
//! - `Ok(None)` for rows that are not transactions (headers, short or blank rows)
//! - `Err(RowError)` for rows shaped like transactions whose fields don't convert

pub mod desjardins;
pub mod simple;

use csv::StringRecord;
use rust_decimal::Decimal;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use tally_core::{CsvFormat, RowError, Transaction};
use tracing::debug;

pub use desjardins::parse_desjardins_row;
pub use simple::parse_simple_row;

pub type RowResult = Result<Option<Transaction>, RowError>;

/// Dispatch a record to the parser for `format`.
pub fn parse_row(format: CsvFormat, record: &StringRecord) -> RowResult {
    match format {
        CsvFormat::Simple => parse_simple_row(record),
        CsvFormat::Desjardins => parse_desjardins_row(record),
    }
}

/// Trimmed column, empty when out of range
pub(crate) fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

/// Largest magnitude accepted in any amount column. Keeps summary totals far
/// from the `Decimal` limits.
pub const MAX_ABS_AMOUNT: i64 = 1_000_000_000_000_000;

// 1,234 or 1,234,567.89: commas only as thousands separators
static GROUPED_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").expect("valid amount regex"));

/// Parse a monetary column. Blank means zero.
///
/// Commas are accepted as thousands separators only; a decimal comma such as
/// `45,20` is an invalid amount, not 4520.
pub(crate) fn parse_amount(name: &'static str, raw: &str) -> Result<Decimal, RowError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let invalid = || RowError::InvalidAmount {
        field: name,
        value: raw.to_string(),
    };

    let cleaned = if raw.contains(',') {
        if !GROUPED_AMOUNT.is_match(raw) {
            return Err(invalid());
        }
        raw.replace(',', "")
    } else {
        raw.to_string()
    };

    let amount = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| invalid())?;

    if amount.abs() > Decimal::from(MAX_ABS_AMOUNT) {
        return Err(RowError::AmountOutOfRange {
            field: name,
            value: raw.to_string(),
        });
    }
    Ok(amount)
}

/// Debit and credit columns carry direction in the column itself. A signed
/// value there is kept as its magnitude.
pub(crate) fn parse_flow_amount(name: &'static str, raw: &str) -> Result<Decimal, RowError> {
    let amount = parse_amount(name, raw)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        debug!(field = name, value = raw.trim(), "negative amount in flow column, keeping magnitude");
    }
    Ok(amount.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("debit", "").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("debit", "  45.20 ").unwrap(), dec!(45.20));
        assert_eq!(parse_amount("balance", "1,234.50").unwrap(), dec!(1234.50));
        assert_eq!(parse_amount("balance", "-1,234,567").unwrap(), dec!(-1234567));
        assert_eq!(parse_amount("balance", "-12.00").unwrap(), dec!(-12));
        assert_eq!(parse_amount("credit", "1e3").unwrap(), dec!(1000));
    }

    #[test]
    fn test_parse_amount_rejects_text() {
        let err = parse_amount("debit", "Debit").unwrap_err();
        assert_eq!(
            err,
            RowError::InvalidAmount { field: "debit", value: "Debit".into() }
        );
    }

    #[test]
    fn test_decimal_comma_is_invalid() {
        for raw in ["45,20", "1,23", "12,3456", ",500", "1,000,00"] {
            assert_eq!(
                parse_amount("debit", raw),
                Err(RowError::InvalidAmount { field: "debit", value: raw.into() }),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_huge_amount_is_out_of_range() {
        let err = parse_amount("credit", "79228162514264337593543950335").unwrap_err();
        assert!(matches!(err, RowError::AmountOutOfRange { field: "credit", .. }));
        assert!(parse_amount("credit", "1e20").is_err());
        assert_eq!(parse_amount("credit", "1000000000000000").unwrap(), dec!(1000000000000000));
    }

    #[test]
    fn test_flow_amount_keeps_magnitude() {
        assert_eq!(parse_flow_amount("debit", "-45.20").unwrap(), dec!(45.20));
        assert_eq!(parse_flow_amount("credit", "-0.00").unwrap(), Decimal::ZERO);
        assert_eq!(parse_flow_amount("credit", "12").unwrap(), dec!(12));
    }

    #[test]
    fn test_dispatch_by_format() {
        let simple = StringRecord::from(vec!["01/15/2024", "Coffee", "3.50", "", "96.50"]);
        assert!(parse_row(CsvFormat::Simple, &simple).unwrap().is_some());
        // Too short for the Desjardins layout
        assert_eq!(parse_row(CsvFormat::Desjardins, &simple).unwrap(), None);
    }
}
