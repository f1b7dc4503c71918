//! glustatd - GlusterFS profile metrics collector daemon.
//!
//! Runs `gluster volume profile <vol> info cumulative` for each configured
//! volume on an interval and writes the parsed measurements to stdout as JSON
//! lines or InfluxDB line protocol. Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use glustat_core::collector::{
    CollectError, CommandRunner, GatherSummary, GlusterCollector, SystemRunner,
};
use glustat_core::config::{DEFAULT_BINARY, DEFAULT_VOLUME, GlusterConfig};
use glustat_core::sink::{JsonLinesSink, LineProtocolSink, MetricsSink};
use glustat_core::util::{format_duration, parse_duration};

/// Output encoding for measurements.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum OutputFormat {
    /// One JSON object per record
    #[default]
    Json,
    /// InfluxDB line protocol
    Influx,
}

/// GlusterFS profile metrics collector daemon.
#[derive(Parser, Debug)]
#[command(name = "glustatd", about = "GlusterFS profile metrics collector", version)]
struct Args {
    /// Volume to profile. Repeat or pass a comma-separated list.
    #[arg(
        long = "volume",
        env = "GLUSTAT_VOLUMES",
        value_delimiter = ',',
        default_value = DEFAULT_VOLUME
    )]
    volumes: Vec<String>,

    /// Path to the gluster binary.
    #[arg(long, env = "GLUSTAT_BINARY", default_value = DEFAULT_BINARY)]
    binary: PathBuf,

    /// Timeout for each gluster invocation (e.g. "1000", "500ms", "2s").
    /// A plain number is milliseconds.
    #[arg(long, env = "GLUSTAT_TIMEOUT", default_value = "1s", value_parser = parse_duration)]
    timeout: Duration,

    /// Run gluster through sudo. The env var accepts 1/0, yes/no, on/off.
    #[arg(
        long,
        env = "GLUSTAT_USE_SUDO",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    use_sudo: bool,

    /// Collection interval (e.g. "10s", "1m").
    #[arg(short, long, default_value = "10s", value_parser = parse_duration)]
    interval: Duration,

    /// Run a single collection cycle and exit.
    #[arg(long)]
    once: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn config(&self) -> GlusterConfig {
        GlusterConfig::default()
            .with_volumes(self.volumes.iter().map(|v| v.trim()).filter(|v| !v.is_empty()))
            .with_binary(&self.binary)
            .with_timeout(self.timeout)
            .with_sudo(self.use_sudo)
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["glustatd", "glustat_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn make_sink(format: OutputFormat) -> Box<dyn FlushSink> {
    let stdout = io::stdout();
    match format {
        OutputFormat::Json => Box::new(JsonLinesSink::new(stdout)),
        OutputFormat::Influx => Box::new(LineProtocolSink::new(stdout)),
    }
}

/// Sink whose buffered output can be pushed out after each cycle.
trait FlushSink: MetricsSink {
    fn flush(&mut self) -> io::Result<()>;
}

impl<W: Write> FlushSink for JsonLinesSink<W> {
    fn flush(&mut self) -> io::Result<()> {
        JsonLinesSink::flush(self)
    }
}

impl<W: Write> FlushSink for LineProtocolSink<W> {
    fn flush(&mut self) -> io::Result<()> {
        LineProtocolSink::flush(self)
    }
}

/// Runs one cycle. A failed cycle is reported through the sink, which logs it.
fn run_cycle<R: CommandRunner>(
    collector: &GlusterCollector<R>,
    sink: &mut dyn FlushSink,
) -> Result<GatherSummary, CollectError> {
    let result = collector.gather(&mut &mut *sink);
    if let Err(ref e) = result {
        sink.add_error(e);
    }
    if let Err(e) = sink.flush() {
        warn!("Failed to flush output: {}", e);
    }
    result
}

fn describe_summary(summary: &GatherSummary) -> String {
    let mut desc = format!(
        "{} volumes, {} records in {}",
        summary.volumes,
        summary.records,
        format_duration(summary.elapsed)
    );
    if summary.field_errors > 0 {
        desc.push_str(&format!(", {} field errors", summary.field_errors));
    }
    desc
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = args.config();
    if config.volumes.is_empty() {
        error!("No volumes configured");
        return ExitCode::FAILURE;
    }

    info!("glustatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: volumes={}, binary={}, timeout={}, use_sudo={}",
        config.volumes.join(","),
        config.binary.display(),
        format_duration(config.timeout),
        config.use_sudo
    );

    let collector = GlusterCollector::new(SystemRunner::new(), config);
    let mut sink = make_sink(args.format);

    if args.once {
        return match run_cycle(&collector, sink.as_mut()) {
            Ok(summary) => {
                info!("Collected {}", describe_summary(&summary));
                ExitCode::SUCCESS
            }
            Err(_) => ExitCode::FAILURE,
        };
    }

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!(
        "Starting collection loop (interval {})",
        format_duration(args.interval)
    );

    let mut cycle_count: u64 = 0;
    while running.load(Ordering::SeqCst) {
        cycle_count += 1;
        match run_cycle(&collector, sink.as_mut()) {
            Ok(summary) => debug!("Cycle #{}: {}", cycle_count, describe_summary(&summary)),
            Err(_) => debug!("Cycle #{} failed", cycle_count),
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = args.interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!("Shutdown complete after {} cycles", cycle_count);
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use glustat_core::collector::MockRunner;
    use glustat_core::models::Measurement;
    use std::sync::Mutex;

    /// Serializes tests that parse `Args`, since they read process env vars.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[derive(Default)]
    struct RecordingSink {
        records: usize,
        errors: Vec<String>,
        flushes: usize,
    }

    impl MetricsSink for RecordingSink {
        fn add_fields(&mut self, _measurement: Measurement) {
            self.records += 1;
        }

        fn add_error(&mut self, err: &dyn std::error::Error) {
            self.errors.push(err.to_string());
        }
    }

    impl FlushSink for RecordingSink {
        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_args_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let args = Args::try_parse_from(["glustatd"]).unwrap();
        let config = args.config();
        assert_eq!(config, GlusterConfig::default());
        assert_eq!(args.interval, Duration::from_secs(10));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.once);
    }

    #[test]
    fn test_args_volumes_and_timeout() {
        let _guard = ENV_LOCK.lock().unwrap();
        let args = Args::try_parse_from([
            "glustatd",
            "--volume",
            "data,logs",
            "--volume",
            "backup",
            "--timeout",
            "1500",
            "--use-sudo",
            "--format",
            "influx",
        ])
        .unwrap();
        let config = args.config();
        assert_eq!(config.volumes, vec!["data", "logs", "backup"]);
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert!(config.use_sudo);
        assert_eq!(args.format, OutputFormat::Influx);
    }

    #[test]
    fn test_args_use_sudo_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        let parse_with = |value: &str| {
            // SAFETY: ENV_LOCK is held, so no other test reads the environment.
            unsafe { std::env::set_var("GLUSTAT_USE_SUDO", value) };
            let parsed = Args::try_parse_from(["glustatd"]).map(|args| args.use_sudo);
            unsafe { std::env::remove_var("GLUSTAT_USE_SUDO") };
            parsed
        };

        for value in ["1", "yes", "on", "true"] {
            assert!(parse_with(value).unwrap(), "{value}");
        }
        for value in ["0", "no", "off", "false"] {
            assert!(!parse_with(value).unwrap(), "{value}");
        }
    }

    #[test]
    fn test_args_reject_bad_timeout() {
        let _guard = ENV_LOCK.lock().unwrap();
        assert!(Args::try_parse_from(["glustatd", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn test_run_cycle_reports_failure_once() {
        let collector =
            GlusterCollector::new(MockRunner::profiling_disabled(), GlusterConfig::default());
        let mut sink = RecordingSink::default();

        let result = run_cycle(&collector, &mut sink);

        assert!(result.is_err());
        assert_eq!(sink.records, 0);
        assert_eq!(sink.errors.len(), 1);
        assert!(sink.errors[0].contains("Profile on Volume vol0 is not started"));
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn test_run_cycle_success() {
        let collector =
            GlusterCollector::new(MockRunner::typical_cluster(), GlusterConfig::default());
        let mut sink = RecordingSink::default();

        let summary = run_cycle(&collector, &mut sink).unwrap();

        assert_eq!(summary.records, 10);
        assert_eq!(sink.records, 10);
        assert!(sink.errors.is_empty());
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn test_describe_summary_mentions_field_errors() {
        let summary = GatherSummary {
            volumes: 2,
            records: 13,
            field_errors: 1,
            elapsed: Duration::from_millis(40),
        };
        assert_eq!(
            describe_summary(&summary),
            "2 volumes, 13 records in 40ms, 1 field errors"
        );
    }
}
