//! Destinations for collected measurements.
//!
//! The collector only talks to the [`MetricsSink`] trait; how records leave
//! the process is up to the implementation:
//! - [`Accumulator`] keeps everything in memory (tests, one-shot callers)
//! - [`JsonLinesSink`] writes one JSON object per record
//! - [`LineProtocolSink`] writes InfluxDB line protocol

mod json;
mod line_protocol;

pub use json::JsonLinesSink;
pub use line_protocol::{LineProtocolSink, format_line};

use crate::models::Measurement;

/// Receives records and non-fatal errors from a collection cycle.
pub trait MetricsSink {
    /// Accepts one parsed record.
    fn add_fields(&mut self, measurement: Measurement);

    /// Accepts an error: a field that failed to parse, or a failed cycle.
    fn add_error(&mut self, error: &dyn std::error::Error);
}

impl<S: MetricsSink + ?Sized> MetricsSink for &mut S {
    fn add_fields(&mut self, measurement: Measurement) {
        (**self).add_fields(measurement);
    }

    fn add_error(&mut self, error: &dyn std::error::Error) {
        (**self).add_error(error);
    }
}

/// In-memory sink.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    pub records: Vec<Measurement>,
    pub errors: Vec<String>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.errors.is_empty()
    }

    /// Drops everything collected so far.
    pub fn clear(&mut self) {
        self.records.clear();
        self.errors.clear();
    }
}

impl MetricsSink for Accumulator {
    fn add_fields(&mut self, measurement: Measurement) {
        self.records.push(measurement);
    }

    fn add_error(&mut self, error: &dyn std::error::Error) {
        self.errors.push(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagSet;

    #[test]
    fn test_accumulator_collects() {
        let mut acc = Accumulator::new();
        assert!(acc.is_empty());

        acc.add_fields(Measurement::single("read", 1.0, TagSet::new()));
        let err = std::io::Error::other("boom");
        acc.add_error(&err);

        assert_eq!(acc.records.len(), 1);
        assert_eq!(acc.errors, vec!["boom"]);

        acc.clear();
        assert!(acc.is_empty());
    }

    #[test]
    fn test_sink_through_mut_ref() {
        fn feed(mut sink: impl MetricsSink) {
            sink.add_fields(Measurement::single("write", 2.0, TagSet::new()));
        }

        let mut acc = Accumulator::new();
        feed(&mut acc);
        assert_eq!(acc.records[0].field("write"), Some(2.0));
    }
}
