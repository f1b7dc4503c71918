//! Duration parsing and formatting for CLI arguments and logs.
//!
//! Accepted formats:
//! - Plain integer: milliseconds (`1000`)
//! - With unit: `250ms`, `2s`, `5m`, `1h`

use std::time::Duration;

/// Error type for duration parsing failures.
#[derive(Debug, Clone)]
pub struct DurationParseError {
    pub input: String,
    pub message: String,
}

impl std::fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse duration '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for DurationParseError {}

/// Parse a duration string.
///
/// | Format | Example | Meaning |
/// |--------|---------|---------|
/// | Integer | `1000` | Milliseconds |
/// | `ms` | `250ms` | Milliseconds |
/// | `s` | `2s` | Seconds |
/// | `m` | `5m` | Minutes |
/// | `h` | `1h` | Hours |
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use glustat_core::util::parse_duration;
///
/// assert_eq!(parse_duration("1000").unwrap(), Duration::from_secs(1));
/// assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let input = input.trim();
    let err = |message: &str| DurationParseError {
        input: input.to_string(),
        message: message.to_string(),
    };

    if input.is_empty() {
        return Err(err("empty duration"));
    }

    let digits_len = input.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(err("expected a number, optionally followed by ms, s, m or h"));
    }

    let (number_str, unit) = input.split_at(digits_len);
    let number: u64 = number_str
        .parse()
        .map_err(|_| err("number out of range"))?;

    let millis_per_unit = match unit.trim() {
        "" | "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        _ => return Err(err("unknown unit, use ms, s, m or h")),
    };

    number
        .checked_mul(millis_per_unit)
        .map(Duration::from_millis)
        .ok_or_else(|| err("duration overflow"))
}

/// Format a duration compactly: `250ms`, `1.5s`, `2m5s`.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        let secs = d.as_secs_f64();
        if millis % 1_000 == 0 {
            format!("{}s", d.as_secs())
        } else {
            format!("{:.1}s", secs)
        }
    } else {
        let secs = d.as_secs();
        if secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}m{}s", secs / 60, secs % 60)
        }
    }
}
