//! Utility modules for glustat.

mod duration;

pub use duration::{DurationParseError, format_duration, parse_duration};
