//! Parsers for `gluster volume profile <vol> info cumulative` output.
//!
//! Pure functions over single lines; easy to test with string inputs.
//! Line recognition is done with plain string scanning, no regex.

use std::num::ParseFloatError;

use crate::models::Fields;

/// Shape of a single report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileLine<'a> {
    /// `Brick: <id>`; the id is kept verbatim.
    BrickHeader(&'a str),
    /// `... Data Read: <digits> bytes`; holds the digit run.
    DataRead(&'a str),
    /// `... Data Written: <digits> bytes`; holds the digit run.
    DataWritten(&'a str),
    /// Trimmed line starting with `<digits>.<digits>`. Not validated yet.
    FopCandidate(&'a str),
    /// Anything else: banners, separators, column headers, blanks.
    Other,
}

const BRICK_PREFIX: &str = "Brick: ";
const DATA_READ: &str = "Data Read: ";
const DATA_WRITTEN: &str = "Data Written: ";
const BYTES_SUFFIX: &str = " bytes";

/// Number of whitespace-separated tokens in a fop statistics line.
///
/// Format:
/// ```text
/// %-latency   Avg-latency   Min-Latency   Max-Latency   No. of calls   Fop
///      0.00    1234.00 us      10.00 us    5000.00 us             42   WRITE
/// ```
/// Unit columns (`us`) sit at indices 2, 4 and 6 and are never read.
pub const FOP_TOKEN_COUNT: usize = 9;

/// Index of the fop name column.
const FOP_NAME_COLUMN: usize = 8;

/// Numeric columns of a fop line: token index and field label.
/// The only place to touch if the report layout changes.
const FOP_COLUMNS: [(usize, &str); 5] = [
    (0, "pct_latency"),
    (1, "avg_latency"),
    (3, "min_latency"),
    (5, "max_latency"),
    (7, "ncalls"),
];

/// Classifies a report line. Checks run in order and the first match wins:
/// brick header, data read, data written, fop candidate.
pub fn classify_line(line: &str) -> ProfileLine<'_> {
    if let Some(brick) = line.strip_prefix(BRICK_PREFIX) {
        return ProfileLine::BrickHeader(brick);
    }
    if let Some(digits) = match_byte_counter(line, DATA_READ) {
        return ProfileLine::DataRead(digits);
    }
    if let Some(digits) = match_byte_counter(line, DATA_WRITTEN) {
        return ProfileLine::DataWritten(digits);
    }
    let trimmed = line.trim();
    if starts_with_decimal(trimmed) {
        return ProfileLine::FopCandidate(trimmed);
    }
    ProfileLine::Other
}

/// Matches `<keyword><digits> bytes` at the end of the line, returning the digits.
///
/// The keyword may be preceded by anything (gluster indents these lines).
fn match_byte_counter<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.strip_suffix(BYTES_SUFFIX)?;
    // Only digits may follow the keyword, so the last occurrence is the one.
    let (_, digits) = head.rsplit_once(keyword)?;
    is_digits(digits).then_some(digits)
}

/// `true` if `s` starts with `<digits>.<digits>`.
fn starts_with_decimal(s: &str) -> bool {
    let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
    if int_len == 0 {
        return false;
    }
    let rest = &s.as_bytes()[int_len..];
    rest.first() == Some(&b'.') && rest.get(1).is_some_and(u8::is_ascii_digit)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// A numeric token that could not be parsed.
///
/// Carries the bare column label (`avg_latency`), not the fop-prefixed
/// field name.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParseError {
    pub label: &'static str,
    pub raw: String,
    pub source: ParseFloatError,
}

impl FieldParseError {
    pub fn new(label: &'static str, raw: impl Into<String>, source: ParseFloatError) -> Self {
        Self {
            label,
            raw: raw.into(),
            source,
        }
    }
}

impl std::fmt::Display for FieldParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected a numerical value for {} = {}",
            self.label, self.raw
        )
    }
}

impl std::error::Error for FieldParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Parsed fop statistics line.
#[derive(Debug, Clone, PartialEq)]
pub struct FopLine {
    /// Lower-cased fop name, e.g. `write`.
    pub op: String,
    /// `<op>_pct_latency`, `<op>_avg_latency`, ... for columns that parsed.
    pub fields: Fields,
    /// One entry per column that failed to parse.
    pub errors: Vec<FieldParseError>,
}

/// Parses a trimmed fop statistics line.
///
/// Returns `None` when the line does not have exactly [`FOP_TOKEN_COUNT`]
/// tokens; such lines are normal in the report and are skipped silently.
/// Columns that fail to parse are left out of `fields` and reported in
/// `errors`; the remaining columns are still returned.
pub fn parse_fop_line(line: &str) -> Option<FopLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != FOP_TOKEN_COUNT {
        return None;
    }

    let op = tokens[FOP_NAME_COLUMN].to_lowercase();
    let mut fields = Fields::new();
    let mut errors = Vec::new();

    for (idx, label) in FOP_COLUMNS {
        let raw = tokens[idx];
        match raw.parse::<f64>() {
            Ok(value) => {
                fields.insert(format!("{}_{}", op, label), value);
            }
            Err(e) => errors.push(FieldParseError::new(label, raw, e)),
        }
    }

    Some(FopLine { op, fields, errors })
}
