//! Collection cycle over all configured volumes.
//!
//! The `GlusterCollector` runs the profile command for every volume, scans
//! the output and hands records to a [`MetricsSink`].

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::collector::profile::{ReportScanner, ScanEvent};
use crate::collector::traits::{CommandError, CommandRunner};
use crate::config::GlusterConfig;
use crate::sink::MetricsSink;
use crate::util::format_duration;

/// Error that aborts a collection cycle.
#[derive(Debug)]
pub enum CollectError {
    /// The gluster command failed for `volume`; later volumes were skipped.
    Command {
        volume: String,
        source: CommandError,
    },
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Command { volume, source } => {
                write!(f, "error gathering metrics for volume {}: {}", volume, source)
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Command { source, .. } => Some(source),
        }
    }
}

/// Counters for one successful cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatherSummary {
    /// Volumes whose output was scanned.
    pub volumes: usize,
    /// Records handed to the sink.
    pub records: usize,
    /// Field errors handed to the sink.
    pub field_errors: usize,
    /// Wall-clock time of the cycle.
    pub elapsed: Duration,
}

/// Collects profile metrics for a fixed set of volumes.
///
/// Holds no per-cycle state, so `gather` may run from several threads at once.
pub struct GlusterCollector<R: CommandRunner> {
    runner: R,
    config: GlusterConfig,
}

impl<R: CommandRunner> GlusterCollector<R> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `runner` - Command runner (real or mock)
    /// * `config` - Volumes, binary path, timeout and sudo flag
    pub fn new(runner: R, config: GlusterConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &GlusterConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs one collection cycle.
    ///
    /// Volumes are processed in configured order. The first failing gluster
    /// invocation ends the cycle and the remaining volumes are not attempted.
    /// Field parse errors go to `sink.add_error` and never end the cycle.
    pub fn gather(&self, sink: &mut dyn MetricsSink) -> Result<GatherSummary, CollectError> {
        let start = Instant::now();
        let mut summary = GatherSummary::default();

        for volume in &self.config.volumes {
            let raw = self
                .runner
                .run(
                    &self.config.binary,
                    volume,
                    self.config.timeout,
                    self.config.use_sudo,
                )
                .map_err(|source| CollectError::Command {
                    volume: volume.clone(),
                    source,
                })?;

            let output = String::from_utf8_lossy(&raw);
            trace!(volume = %volume, bytes = raw.len(), "scanning profile output");

            let (mut records, mut field_errors) = (0, 0);
            for event in ReportScanner::new(volume, &output) {
                match event {
                    ScanEvent::Record(m) => {
                        records += 1;
                        sink.add_fields(m);
                    }
                    ScanEvent::FieldError(e) => {
                        field_errors += 1;
                        sink.add_error(&e);
                    }
                }
            }
            debug!(volume = %volume, records, field_errors, "volume scanned");

            summary.volumes += 1;
            summary.records += records;
            summary.field_errors += field_errors;
        }

        summary.elapsed = start.elapsed();
        debug!(
            volumes = summary.volumes,
            records = summary.records,
            field_errors = summary.field_errors,
            elapsed = %format_duration(summary.elapsed),
            "gather complete"
        );
        Ok(summary)
    }
}
