//! tally-finance: statement summary (totals, monthly breakdown, top descriptions, largest movements) and its text report

pub mod report;
pub mod summary;

pub use report::render_report;
pub use summary::{summarize, LARGEST_COUNT, TOP_DESCRIPTIONS};
