use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::{Transaction, TransactionDate};
use tally_finance::{summarize, LARGEST_COUNT, TOP_DESCRIPTIONS};
use tally_ingest::parse_csv_str;

#[test]
fn test_simple_statement_to_summary() {
    let text = "\
01/15/2024,Grocery Store,45.20,,1000.00
01/16/2024,Paycheck,,2000.00,2954.80
";
    let parsed = parse_csv_str(text).unwrap();
    let summary = summarize(&parsed.transactions);
    let stats = summary.stats().unwrap();

    assert_eq!(stats.total_credits, dec!(2000.00));
    assert_eq!(stats.total_debits, dec!(45.20));
    assert_eq!(stats.net_change, dec!(1954.80));

    let v = serde_json::to_value(&summary).unwrap();
    assert_eq!(v["date_range"]["start"], "2024-01-15T00:00:00");
    assert_eq!(v["date_range"]["end"], "2024-01-16T00:00:00");
    assert_eq!(v["monthly_summary"]["2024-01"]["count"], 2);
    assert_eq!(v["monthly_summary"]["2024-01"]["net"].as_f64(), Some(1954.8));
}

#[test]
fn test_desjardins_row_without_amounts_is_counted() {
    let text = r#""Desjardins Ontario","1","EOP","2024/03/01","00001","Frais","","","","","","","","100.00"
"Desjardins Ontario","1","EOP","2024/03/02","00002","Retrait","","20.00","","","","","","80.00"
"#;
    let parsed = parse_csv_str(text).unwrap();
    let stats = summarize(&parsed.transactions).stats().cloned().unwrap();

    assert_eq!(stats.total_transactions, 2);
    assert_eq!(parsed.transactions[0].debit, Decimal::ZERO);
    assert_eq!(parsed.transactions[0].credit, Decimal::ZERO);
    assert_eq!(stats.monthly_summary["2024-03"].count, 2);
    assert_eq!(stats.total_debits, dec!(20));
}

#[test]
fn test_out_of_range_amounts_never_reach_summary() {
    let text = "\
01/15/2024,Huge,,79228162514264337593543950335,0
01/16/2024,Huge,,79228162514264337593543950335,0
01/17/2024,Coffee,3.50,,96.50
";
    let parsed = parse_csv_str(text).unwrap();
    assert_eq!(parsed.diagnostics.failed, 2);
    let stats = summarize(&parsed.transactions).stats().cloned().unwrap();
    assert_eq!(stats.total_transactions, 1);
    assert_eq!(stats.total_credits, Decimal::ZERO);
    assert_eq!(stats.net_change, dec!(-3.50));
}

fn arb_date() -> impl Strategy<Value = TransactionDate> {
    prop_oneof![
        4 => (2020u32..2026u32, 1u32..13u32, 1u32..29u32)
            .prop_map(|(y, m, d)| TransactionDate::parse_or_raw(&format!("{m:02}/{d:02}/{y}"), "%m/%d/%Y")),
        1 => (2020u32..2026u32, 1u32..13u32, 1u32..29u32)
            .prop_map(|(y, m, d)| TransactionDate::Raw(format!("{y}/{m:02}/{d:02}"))),
        1 => "[a-z]{3,8}".prop_map(TransactionDate::Raw),
    ]
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (
        arb_date(),
        prop_oneof![
            Just("Coffee".to_string()),
            Just("Rent".to_string()),
            Just("Paycheck".to_string()),
            Just("Fee".to_string()),
            "[A-Z][a-z]{2,6}",
        ],
        (0i64..500_000).prop_map(|n| Decimal::new(n, 2)),
        (0i64..500_000).prop_map(|n| Decimal::new(n, 2)),
    )
        .prop_map(|(date, desc, debit, credit)| Transaction::new(date, desc, debit, credit, Decimal::ZERO))
}

proptest! {
    #[test]
    fn prop_summary_invariants(txns in prop::collection::vec(arb_transaction(), 0..60)) {
        let summary = summarize(&txns);
        let Some(stats) = summary.stats() else {
            prop_assert!(txns.is_empty());
            return Ok(());
        };

        prop_assert_eq!(stats.total_transactions, txns.len());
        prop_assert_eq!(stats.net_change, stats.total_credits - stats.total_debits);

        let with_month = txns.iter().filter(|t| t.date.month_key().is_some()).count();
        let bucketed: usize = stats.monthly_summary.values().map(|m| m.count).sum();
        prop_assert_eq!(bucketed, with_month);
        for m in stats.monthly_summary.values() {
            prop_assert_eq!(m.net, m.credits - m.debits);
        }

        prop_assert!(stats.common_descriptions.len() <= TOP_DESCRIPTIONS);
        for w in stats.common_descriptions.windows(2) {
            prop_assert!(w[0].count >= w[1].count);
        }

        prop_assert!(stats.largest_credits.len() <= LARGEST_COUNT);
        prop_assert!(stats.largest_debits.len() <= LARGEST_COUNT);
        prop_assert_eq!(stats.largest_credits.len(), txns.len().min(LARGEST_COUNT));
        for w in stats.largest_credits.windows(2) {
            prop_assert!(w[0].credit >= w[1].credit);
        }
        for w in stats.largest_debits.windows(2) {
            prop_assert!(w[0].debit >= w[1].debit);
        }
        let max_debit = txns.iter().map(|t| t.debit).max().unwrap_or_default();
        prop_assert_eq!(stats.largest_debits[0].debit, max_debit);
    }
}
