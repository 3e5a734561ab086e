//! Statement layout detection.
//!
//! Only the head of the file is inspected. Detection never fails: anything
//! unrecognized is treated as the simple layout and the row parser drops what
//! it cannot read.

use regex::Regex;
use std::sync::LazyLock;
use tally_core::CsvFormat;

/// How much of the file is looked at, in characters
pub const DETECTION_SAMPLE_CHARS: usize = 2000;

/// Quoted bank name that starts every row of a Desjardins export
pub const DESJARDINS_MARKER: &str = "\"Desjardins Ontario\"";

/// Classify a statement from its leading content.
pub fn detect_format(content: &str) -> CsvFormat {
    let sample = leading_chars(content, DETECTION_SAMPLE_CHARS);

    if sample.contains(DESJARDINS_MARKER) {
        return CsvFormat::Desjardins;
    }

    if starts_with_us_date(sample) {
        return CsvFormat::Simple;
    }

    CsvFormat::Simple
}

// MM/DD/YYYY at the start of any line
static US_DATE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d{2}/\d{2}/\d{4}").expect("valid date regex"));

fn starts_with_us_date(sample: &str) -> bool {
    US_DATE_LINE.is_match(sample)
}

fn leading_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
