//! Summary aggregation over a parsed statement.
//!
//! Everything is computed in one pass over the transactions in file order;
//! rankings use stable sorts so ties keep the order rows appeared in.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tally_core::{DateRange, DescriptionCount, MonthlyTotals, Summary, SummaryStats, Transaction};
use tracing::warn;

/// Entries kept in `common_descriptions`
pub const TOP_DESCRIPTIONS: usize = 10;
/// Entries kept in `largest_credits` / `largest_debits`
pub const LARGEST_COUNT: usize = 5;

/// Summarize `txns`. An empty slice gives `Summary::Empty`.
pub fn summarize(txns: &[Transaction]) -> Summary {
    let (Some(first), Some(last)) = (txns.first(), txns.last()) else {
        return Summary::Empty {};
    };

    let total_credits = saturating_total(txns.iter().map(|t| t.credit));
    let total_debits = saturating_total(txns.iter().map(|t| t.debit));

    Summary::Stats(Box::new(SummaryStats {
        total_transactions: txns.len(),
        total_credits,
        total_debits,
        net_change: total_credits.saturating_sub(total_debits),
        date_range: DateRange {
            start: first.date.clone(),
            end: last.date.clone(),
        },
        monthly_summary: monthly_breakdown(txns),
        common_descriptions: common_descriptions(txns),
        largest_credits: largest_by(txns, |t| t.credit),
        largest_debits: largest_by(txns, |t| t.debit),
    }))
}

// Totals clamp at the Decimal bounds rather than overflow
fn saturating_total(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

fn monthly_breakdown(txns: &[Transaction]) -> BTreeMap<String, MonthlyTotals> {
    let mut months: BTreeMap<String, MonthlyTotals> = BTreeMap::new();
    let mut unbucketed = 0usize;

    for t in txns {
        let Some(key) = t.date.month_key() else {
            unbucketed += 1;
            continue;
        };
        let m = months.entry(key).or_default();
        m.credits = m.credits.saturating_add(t.credit);
        m.debits = m.debits.saturating_add(t.debit);
        m.count += 1;
    }

    if unbucketed > 0 {
        warn!(unbucketed, "transactions without a usable month left out of monthly summary");
    }

    for m in months.values_mut() {
        m.net = m.credits.saturating_sub(m.debits);
    }
    months
}

fn common_descriptions(txns: &[Transaction]) -> Vec<DescriptionCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<DescriptionCount> = Vec::new();

    for t in txns {
        match index.get(t.description.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(t.description.as_str(), counts.len());
                counts.push(DescriptionCount {
                    description: t.description.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_DESCRIPTIONS);
    counts
}

fn largest_by(txns: &[Transaction], key: impl Fn(&Transaction) -> Decimal) -> Vec<Transaction> {
    let mut ranked: Vec<&Transaction> = txns.iter().collect();
    ranked.sort_by(|a, b| key(b).cmp(&key(a)));
    ranked.into_iter().take(LARGEST_COUNT).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_core::TransactionDate;

    fn txn(date: &str, desc: &str, debit: Decimal, credit: Decimal) -> Transaction {
        Transaction::new(TransactionDate::parse_or_raw(date, "%m/%d/%Y"), desc, debit, credit, dec!(0))
    }

    #[test]
    fn test_empty_input_gives_empty_summary() {
        let s = summarize(&[]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_two_row_example() {
        let txns = vec![
            txn("01/15/2024", "Grocery Store", dec!(45.20), dec!(0)),
            txn("01/16/2024", "Paycheck", dec!(0), dec!(2000.00)),
        ];
        let s = summarize(&txns);
        let stats = s.stats().unwrap();

        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.total_credits, dec!(2000.00));
        assert_eq!(stats.total_debits, dec!(45.20));
        assert_eq!(stats.net_change, dec!(1954.80));
        assert_eq!(stats.date_range.start.to_string(), "2024-01-15T00:00:00");
        assert_eq!(stats.date_range.end.to_string(), "2024-01-16T00:00:00");

        let jan = &stats.monthly_summary["2024-01"];
        assert_eq!(jan.credits, dec!(2000.00));
        assert_eq!(jan.debits, dec!(45.20));
        assert_eq!(jan.net, dec!(1954.80));
        assert_eq!(jan.count, 2);
    }

    #[test]
    fn test_date_range_is_positional() {
        let txns = vec![
            txn("03/01/2024", "a", dec!(1), dec!(0)),
            txn("01/01/2024", "b", dec!(1), dec!(0)),
        ];
        let stats = summarize(&txns).stats().cloned().unwrap();
        assert_eq!(stats.date_range.start.to_string(), "2024-03-01T00:00:00");
        assert_eq!(stats.date_range.end.to_string(), "2024-01-01T00:00:00");
    }

    #[test]
    fn test_months_sorted_and_unbucketed_excluded() {
        let txns = vec![
            txn("02/10/2024", "a", dec!(5), dec!(0)),
            txn("12/31/2023", "b", dec!(0), dec!(7)),
            Transaction::new(TransactionDate::Raw("2024/01/05".into()), "c", dec!(1), dec!(0), dec!(0)),
            Transaction::new(TransactionDate::Raw("yesterday".into()), "d", dec!(3), dec!(0), dec!(0)),
        ];
        let stats = summarize(&txns).stats().cloned().unwrap();

        let keys: Vec<_> = stats.monthly_summary.keys().cloned().collect();
        assert_eq!(keys, vec!["2023-12", "2024-01", "2024-02"]);
        let bucketed: usize = stats.monthly_summary.values().map(|m| m.count).sum();
        assert_eq!(bucketed, 3);
        assert_eq!(stats.total_transactions, 4);
        assert_eq!(stats.total_debits, dec!(9));
    }

    #[test]
    fn test_common_descriptions_ties_keep_first_seen_order() {
        let mut txns = Vec::new();
        for d in ["b", "a", "c", "a", "b", "d"] {
            txns.push(txn("01/01/2024", d, dec!(1), dec!(0)));
        }
        let stats = summarize(&txns).stats().cloned().unwrap();
        let got: Vec<_> = stats
            .common_descriptions
            .iter()
            .map(|c| (c.description.as_str(), c.count))
            .collect();
        assert_eq!(got, vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]);
    }

    #[test]
    fn test_common_descriptions_truncated_to_ten() {
        let txns: Vec<_> = (0..15)
            .map(|i| txn("01/01/2024", &format!("merchant {i}"), dec!(1), dec!(0)))
            .collect();
        let stats = summarize(&txns).stats().cloned().unwrap();
        assert_eq!(stats.common_descriptions.len(), TOP_DESCRIPTIONS);
        assert_eq!(stats.common_descriptions[0].description, "merchant 0");
        assert_eq!(stats.common_descriptions[9].description, "merchant 9");
    }

    #[test]
    fn test_largest_debits_stable_and_truncated() {
        let txns = vec![
            txn("01/01/2024", "small", dec!(1), dec!(0)),
            txn("01/02/2024", "big-1", dec!(50), dec!(0)),
            txn("01/03/2024", "mid", dec!(20), dec!(0)),
            txn("01/04/2024", "big-2", dec!(50), dec!(0)),
            txn("01/05/2024", "tiny", dec!(0.5), dec!(0)),
            txn("01/06/2024", "mid-2", dec!(20), dec!(0)),
            txn("01/07/2024", "credit", dec!(0), dec!(100)),
        ];
        let stats = summarize(&txns).stats().cloned().unwrap();

        let debits: Vec<_> = stats.largest_debits.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(debits, vec!["big-1", "big-2", "mid", "mid-2", "small"]);

        let credits: Vec<_> = stats.largest_credits.iter().map(|t| t.description.as_str()).collect();
        // One real credit, then zero-credit rows in file order
        assert_eq!(credits, vec!["credit", "small", "big-1", "mid", "big-2"]);
    }

    #[test]
    fn test_extreme_amounts_do_not_overflow() {
        let txns = vec![
            txn("01/15/2024", "huge", dec!(0), Decimal::MAX),
            txn("01/16/2024", "huge", dec!(0), Decimal::MAX),
            txn("01/17/2024", "drain", Decimal::MAX, dec!(0)),
        ];
        let stats = summarize(&txns).stats().cloned().unwrap();
        assert_eq!(stats.total_credits, Decimal::MAX);
        assert_eq!(stats.total_debits, Decimal::MAX);
        assert_eq!(stats.net_change, Decimal::ZERO);
        assert_eq!(stats.monthly_summary["2024-01"].credits, Decimal::MAX);
        assert_eq!(stats.monthly_summary["2024-01"].count, 3);
    }

    #[test]
    fn test_summary_json_shape() {
        let txns = vec![txn("01/15/2024", "Grocery Store", dec!(45.20), dec!(0))];
        let v = serde_json::to_value(summarize(&txns)).unwrap();
        assert_eq!(v["total_transactions"], 1);
        assert_eq!(v["date_range"]["start"], "2024-01-15T00:00:00");
        assert_eq!(v["monthly_summary"]["2024-01"]["count"], 1);
        assert_eq!(v["largest_debits"][0]["description"], "Grocery Store");
        assert_eq!(serde_json::to_string(&summarize(&[])).unwrap(), "{}");
    }
}
