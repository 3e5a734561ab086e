//! Plain-text rendering of a summary for terminal display

use std::fmt::Write;
use tally_core::{Summary, Transaction};

pub fn render_report(summary: &Summary) -> String {
    let Some(stats) = summary.stats() else {
        return "No transactions.\n".to_string();
    };

    let mut s = String::new();
    s.push_str("# Statement summary\n\n");
    let _ = writeln!(s, "Transactions: {}", stats.total_transactions);
    let _ = writeln!(s, "Period:       {} .. {}", stats.date_range.start, stats.date_range.end);
    let _ = writeln!(s, "Credits:      {:.2}", stats.total_credits);
    let _ = writeln!(s, "Debits:       {:.2}", stats.total_debits);
    let _ = writeln!(s, "Net change:   {:.2}", stats.net_change);

    if !stats.monthly_summary.is_empty() {
        s.push_str("\n## Monthly\n");
        let _ = writeln!(s, "{:<8} {:>12} {:>12} {:>12} {:>6}", "month", "credits", "debits", "net", "count");
        for (month, m) in &stats.monthly_summary {
            let _ = writeln!(
                s,
                "{:<8} {:>12.2} {:>12.2} {:>12.2} {:>6}",
                month, m.credits, m.debits, m.net, m.count
            );
        }
    }

    if !stats.common_descriptions.is_empty() {
        s.push_str("\n## Most common descriptions\n");
        for c in &stats.common_descriptions {
            let _ = writeln!(s, "- {} ({})", c.description, c.count);
        }
    }

    push_largest(&mut s, "Largest credits", &stats.largest_credits, |t| t.credit.is_zero(), |t| {
        format!("{:.2}", t.credit)
    });
    push_largest(&mut s, "Largest debits", &stats.largest_debits, |t| t.debit.is_zero(), |t| {
        format!("{:.2}", t.debit)
    });

    s
}

fn push_largest(
    s: &mut String,
    title: &str,
    txns: &[Transaction],
    is_zero: impl Fn(&Transaction) -> bool,
    amount: impl Fn(&Transaction) -> String,
) {
    // Zero-amount rows only pad the ranking
    let shown: Vec<&Transaction> = txns.iter().filter(|t| !is_zero(t)).collect();
    if shown.is_empty() {
        return;
    }
    let _ = writeln!(s, "\n## {title}");
    for t in shown {
        let _ = writeln!(s, "- {} | {} | {}", t.date, amount(t), t.description);
    }
}
