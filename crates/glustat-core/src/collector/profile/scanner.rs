//! Single-pass scanner turning a profile report into measurements.

use std::collections::VecDeque;
use std::str::Lines;

use tracing::trace;

use super::context::BrickContext;
use super::parser::{FieldParseError, ProfileLine, classify_line, parse_fop_line};
use crate::models::{MEASUREMENT, Measurement};

/// Item produced by [`ReportScanner`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Record(Measurement),
    /// A numeric column that did not parse. Never stops the scan.
    FieldError(FieldParseError),
}

/// Lazy iterator over the measurements of one volume's report.
///
/// Walks lines in order with no lookahead. Field errors of a fop line are
/// yielded before that line's record.
pub struct ReportScanner<'a> {
    lines: Lines<'a>,
    context: BrickContext<'a>,
    pending: VecDeque<ScanEvent>,
}

impl<'a> ReportScanner<'a> {
    pub fn new(volume: &'a str, output: &'a str) -> Self {
        Self {
            lines: output.lines(),
            context: BrickContext::new(volume),
            pending: VecDeque::new(),
        }
    }

    fn scan_line(&mut self, line: &str) {
        match classify_line(line) {
            ProfileLine::BrickHeader(brick) => {
                trace!(volume = self.context.volume(), brick, "brick header");
                self.context.on_brick_header(brick);
            }
            ProfileLine::DataRead(digits) => self.push_counter("read", digits),
            ProfileLine::DataWritten(digits) => self.push_counter("write", digits),
            ProfileLine::FopCandidate(trimmed) => match parse_fop_line(trimmed) {
                Some(fop) => {
                    trace!(op = %fop.op, fields = fop.fields.len(), "fop line");
                    self.pending
                        .extend(fop.errors.into_iter().map(ScanEvent::FieldError));
                    self.pending.push_back(ScanEvent::Record(Measurement::new(
                        MEASUREMENT,
                        fop.fields,
                        self.context.tags().clone(),
                    )));
                }
                None => trace!(line = trimmed, "skipping line with unexpected column count"),
            },
            ProfileLine::Other => {}
        }
    }

    fn push_counter(&mut self, field: &'static str, digits: &str) {
        // The classifier only hands over ASCII digit runs.
        let event = match digits.parse::<f64>() {
            Ok(value) => ScanEvent::Record(Measurement::single(
                field,
                value,
                self.context.tags().clone(),
            )),
            Err(e) => ScanEvent::FieldError(FieldParseError::new(field, digits, e)),
        };
        self.pending.push_back(event);
    }
}

impl Iterator for ReportScanner<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let line = self.lines.next()?;
            self.scan_line(line);
        }
    }
}

/// Everything produced by scanning one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutput {
    pub records: Vec<Measurement>,
    pub errors: Vec<FieldParseError>,
}

/// Scans a whole report eagerly, splitting records from field errors.
pub fn scan(volume: &str, output: &str) -> ScanOutput {
    let mut result = ScanOutput::default();
    for event in ReportScanner::new(volume, output) {
        match event {
            ScanEvent::Record(m) => result.records.push(m),
            ScanEvent::FieldError(e) => result.errors.push(e),
        }
    }
    result
}
