//! Parsing of `gluster volume profile <vol> info cumulative` reports.
//!
//! - `parser` — line classification and fop column extraction
//! - `context` — current volume/brick tags
//! - `scanner` — line-by-line walk producing measurements

pub mod context;
pub mod parser;
pub mod scanner;

pub use context::BrickContext;
pub use parser::{FieldParseError, FopLine, ProfileLine, classify_line, parse_fop_line};
pub use scanner::{ReportScanner, ScanEvent, ScanOutput, scan};
