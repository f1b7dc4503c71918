//! InfluxDB line protocol output.
//!
//! ```text
//! glusterfs,brick=server1:/data/brick1,volume=vol0 read=12345 1770483600000000000
//! ```

use std::fmt::Write as _;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use tracing::{error, trace};

use super::MetricsSink;
use crate::models::Measurement;

/// Formats one record as a line protocol line, without trailing newline.
///
/// Non-finite values are dropped since the protocol cannot carry them.
/// Returns `None` when no field is left.
pub fn format_line(m: &Measurement, time: Option<DateTime<Utc>>) -> Option<String> {
    let mut line = String::with_capacity(128);
    escape_into(&mut line, &m.measurement, &[',', ' ']);

    for (key, value) in m.tags.iter() {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape_into(&mut line, value, &[',', '=', ' ']);
    }

    let mut sep = ' ';
    for (key, value) in &m.fields {
        if !value.is_finite() {
            trace!(field = %key, "dropping non-finite value");
            continue;
        }
        line.push(sep);
        sep = ',';
        escape_into(&mut line, key, &[',', '=', ' ']);
        let _ = write!(line, "={}", value);
    }
    if sep == ' ' {
        return None;
    }

    if let Some(nanos) = time.and_then(|t| t.timestamp_nanos_opt()) {
        let _ = write!(line, " {}", nanos);
    }
    Some(line)
}

fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Writes records as InfluxDB line protocol.
pub struct LineProtocolSink<W: Write> {
    writer: W,
    fixed_time: Option<DateTime<Utc>>,
    write_errors: u64,
}

impl<W: Write> LineProtocolSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            fixed_time: None,
            write_errors: 0,
        }
    }

    /// Stamps every record with `time` instead of the current time.
    pub fn with_fixed_time(mut self, time: DateTime<Utc>) -> Self {
        self.fixed_time = Some(time);
        self
    }

    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricsSink for LineProtocolSink<W> {
    fn add_fields(&mut self, measurement: Measurement) {
        let time = self.fixed_time.unwrap_or_else(Utc::now);
        let Some(line) = format_line(&measurement, Some(time)) else {
            trace!("skipping record without fields");
            return;
        };
        if let Err(e) = writeln!(self.writer, "{}", line) {
            self.write_errors += 1;
            error!("Failed to write record: {}", e);
        }
    }

    fn add_error(&mut self, err: &dyn std::error::Error) {
        error!("{}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fields, MEASUREMENT, TagSet};
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let m = Measurement::single(
            "read",
            12345.0,
            TagSet::for_brick("vol0", "server1:/data/brick1"),
        );
        assert_eq!(
            format_line(&m, None).unwrap(),
            "glusterfs,brick=server1:/data/brick1,volume=vol0 read=12345"
        );
    }

    #[test]
    fn test_format_line_with_time() {
        let time = Utc.with_ymd_and_hms(2026, 2, 7, 17, 0, 0).unwrap();
        let m = Measurement::single("write", 67.0, TagSet::new());
        assert_eq!(
            format_line(&m, Some(time)).unwrap(),
            "glusterfs write=67 1770483600000000000"
        );
    }

    #[test]
    fn test_format_line_escapes_tags() {
        let m = Measurement::single("read", 1.5, TagSet::for_brick("my vol", "a,b=c"));
        assert_eq!(
            format_line(&m, None).unwrap(),
            r"glusterfs,brick=a\,b\=c,volume=my\ vol read=1.5"
        );
    }

    #[test]
    fn test_format_line_multiple_fields_sorted() {
        let mut fields = Fields::new();
        fields.insert("write_ncalls".to_string(), 42.0);
        fields.insert("write_avg_latency".to_string(), 1234.5);
        let m = Measurement::new(MEASUREMENT, fields, TagSet::new());
        assert_eq!(
            format_line(&m, None).unwrap(),
            "glusterfs write_avg_latency=1234.5,write_ncalls=42"
        );
    }

    #[test]
    fn test_format_line_drops_non_finite() {
        let mut fields = Fields::new();
        fields.insert("a".to_string(), f64::NAN);
        let m = Measurement::new(MEASUREMENT, fields.clone(), TagSet::new());
        assert!(format_line(&m, None).is_none());

        fields.insert("b".to_string(), 2.0);
        let m = Measurement::new(MEASUREMENT, fields, TagSet::new());
        assert_eq!(format_line(&m, None).unwrap(), "glusterfs b=2");
    }

    #[test]
    fn test_sink_writes_lines() {
        let time = Utc.with_ymd_and_hms(2026, 2, 7, 17, 0, 0).unwrap();
        let mut sink = LineProtocolSink::new(Vec::new()).with_fixed_time(time);
        sink.add_fields(Measurement::single("read", 1.0, TagSet::new()));
        sink.add_fields(Measurement::new(MEASUREMENT, Fields::new(), TagSet::new()));
        sink.add_error(&std::io::Error::other("ignored"));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "glusterfs read=1 1770483600000000000\n");
    }
}
