//! Canonical transaction record produced by every statement parser

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Timestamp layout used when a date was understood (`2024-01-15T00:00:00`)
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Column layout of a statement export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CsvFormat {
    /// date, description, debit, credit, balance
    #[serde(rename = "simple")]
    Simple,
    /// Desjardins account export (fixed-position columns, bank name first)
    #[serde(rename = "desjardins")]
    Desjardins,
}

impl CsvFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CsvFormat::Simple => "simple",
            CsvFormat::Desjardins => "desjardins",
        }
    }
}

impl fmt::Display for CsvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CsvFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(CsvFormat::Simple),
            "desjardins" => Ok(CsvFormat::Desjardins),
            other => Err(format!("unknown csv format: {other}")),
        }
    }
}

/// A transaction date: either understood, or kept verbatim so the row is not lost.
///
/// Serializes as a plain string in both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionDate {
    Parsed(NaiveDateTime),
    Raw(String),
}

impl TransactionDate {
    /// Parse `raw` as a calendar date with `format`, falling back to the raw text.
    ///
    /// A `%Y` field must be exactly four digits in `raw`; chrono alone would
    /// read `01/15/24` as year 24.
    pub fn parse_or_raw(raw: &str, format: &str) -> Self {
        if !year_has_four_digits(raw, format) {
            return TransactionDate::Raw(raw.to_string());
        }
        match NaiveDate::parse_from_str(raw, format) {
            Ok(d) => TransactionDate::Parsed(d.and_time(chrono::NaiveTime::MIN)),
            Err(_) => TransactionDate::Raw(raw.to_string()),
        }
    }

    /// Interpret an already-normalized string (the serialized form).
    pub fn from_iso_or_raw(s: &str) -> Self {
        match NaiveDateTime::parse_from_str(s, ISO_DATETIME_FORMAT) {
            Ok(dt) => TransactionDate::Parsed(dt),
            Err(_) => TransactionDate::Raw(s.to_string()),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, TransactionDate::Parsed(_))
    }

    /// `YYYY-MM` bucket for the monthly breakdown.
    ///
    /// Raw dates fall back to two textual rules: anything containing a `T`
    /// contributes its first 7 characters, and a three-part slash date
    /// `A/B/C` becomes `A-B`. Returns `None` when neither applies.
    pub fn month_key(&self) -> Option<String> {
        match self {
            TransactionDate::Parsed(dt) => Some(dt.format("%Y-%m").to_string()),
            TransactionDate::Raw(raw) => raw_month_key(raw),
        }
    }
}

/// Locate the `%Y` component of a `/`-separated format and check its width in `raw`.
fn year_has_four_digits(raw: &str, format: &str) -> bool {
    let Some(idx) = format.split('/').position(|part| part == "%Y") else {
        return true;
    };
    raw.split('/')
        .nth(idx)
        .is_some_and(|year| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()))
}

fn raw_month_key(raw: &str) -> Option<String> {
    if raw.contains('T') {
        return Some(raw.chars().take(7).collect());
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() == 3 {
        return Some(format!("{}-{}", parts[0], parts[1]));
    }
    None
}

impl fmt::Display for TransactionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionDate::Parsed(dt) => write!(f, "{}", dt.format(ISO_DATETIME_FORMAT)),
            TransactionDate::Raw(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for TransactionDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TransactionDate::from_iso_or_raw(&s))
    }
}

/// One normalized ledger entry.
///
/// `debit` is money leaving the account, `credit` money entering it; both are
/// zero when the source row left them blank. `bank` and `transaction_id` are
/// only filled by layouts that carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: TransactionDate,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl Transaction {
    pub fn new(
        date: TransactionDate,
        description: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
        balance: Decimal,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            debit,
            credit,
            balance,
            bank: None,
            transaction_id: None,
        }
    }

    /// Attach the institution fields some layouts provide
    pub fn with_source(mut self, bank: impl Into<String>, transaction_id: impl Into<String>) -> Self {
        self.bank = Some(bank.into());
        self.transaction_id = Some(transaction_id.into());
        self
    }

    /// Credit minus debit, saturating at the `Decimal` bounds
    pub fn net(&self) -> Decimal {
        self.credit.saturating_sub(self.debit)
    }
}
