//! JSON lines output.

use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{error, trace};

use super::MetricsSink;
use crate::models::{Fields, Measurement, TagSet};

#[derive(Serialize)]
struct JsonRecord<'a> {
    time: String,
    measurement: &'a str,
    tags: &'a TagSet,
    fields: &'a Fields,
}

/// Writes each record as one JSON object per line.
///
/// Errors are not written to the stream; they are logged.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    fixed_time: Option<DateTime<Utc>>,
    write_errors: u64,
}

impl<W: Write> JsonLinesSink<W> {
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

    /// Number of records that could not be written.
    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, m: &Measurement, fields: &Fields) -> io::Result<()> {
        let time = self.fixed_time.unwrap_or_else(Utc::now);
        let record = JsonRecord {
            time: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            measurement: &m.measurement,
            tags: &m.tags,
            fields,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")
    }
}

/// JSON numbers cannot carry NaN or infinity, so those fields are dropped.
fn finite_fields(fields: &Fields) -> Fields {
    fields
        .iter()
        .filter(|(key, value)| {
            let keep = value.is_finite();
            if !keep {
                trace!(field = %key, "dropping non-finite value");
            }
            keep
        })
        .map(|(key, value)| (key.clone(), *value))
        .collect()
}

impl<W: Write> MetricsSink for JsonLinesSink<W> {
    fn add_fields(&mut self, measurement: Measurement) {
        let fields = finite_fields(&measurement.fields);
        if fields.is_empty() {
            trace!("skipping record without fields");
            return;
        }
        if let Err(e) = self.write_record(&measurement, &fields) {
            self.write_errors += 1;
            error!("Failed to write record: {}", e);
        }
    }

    fn add_error(&mut self, err: &dyn std::error::Error) {
        error!("{}", err);
    }
}
