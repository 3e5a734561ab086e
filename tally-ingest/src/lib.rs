//! tally-ingest: statement format detection, per-layout row parsers and CSV normalization.

pub mod detect;
pub mod parsers;
pub mod reader;
pub mod writer;

pub use detect::{detect_format, DETECTION_SAMPLE_CHARS};
pub use reader::{parse_csv_bytes, parse_csv_file, parse_csv_str, parse_records, ParseDiagnostics, ParsedStatement};
pub use writer::write_simple_csv;
