//! Aggregate shapes computed over a transaction sequence

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::transaction::{Transaction, TransactionDate};

/// Summary of a statement.
///
/// An empty statement yields `Empty`, which serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Stats(Box<SummaryStats>),
    Empty {},
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        matches!(self, Summary::Empty {})
    }

    pub fn stats(&self) -> Option<&SummaryStats> {
        match self {
            Summary::Stats(s) => Some(s),
            Summary::Empty {} => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_transactions: usize,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub net_change: Decimal,
    pub date_range: DateRange,
    /// Keyed by `YYYY-MM`, ascending
    pub monthly_summary: BTreeMap<String, MonthlyTotals>,
    pub common_descriptions: Vec<DescriptionCount>,
    pub largest_credits: Vec<Transaction>,
    pub largest_debits: Vec<Transaction>,
}

/// First and last dates in file order (not chronological)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: TransactionDate,
    pub end: TransactionDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub credits: Decimal,
    pub debits: Decimal,
    pub net: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionCount {
    pub description: String,
    pub count: usize,
}
