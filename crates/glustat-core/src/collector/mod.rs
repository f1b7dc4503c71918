//! GlusterFS profile metrics collector.
//!
//! This module runs `gluster volume profile <vol> info cumulative` for each
//! configured volume and turns the report into tagged measurements, with
//! support for mocking the CLI in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      GlusterCollector                       │
//! │   for each volume:                                          │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │   CommandRunner     │──▶│      ReportScanner          │  │
//! │  │  (trait)            │   │  - classify_line            │  │
//! │  └──────────┬──────────┘   │  - BrickContext             │  │
//! │             │              │  - parse_fop_line           │  │
//! │             │              └──────────────┬──────────────┘  │
//! │             │                             │                 │
//! │             │                      ┌──────▼──────┐          │
//! │             │                      │ MetricsSink │ (trait)  │
//! │             │                      └─────────────┘          │
//! └─────────────┼───────────────────────────────────────────────┘
//!               │
//!       ┌───────┴───────┐
//!       │               │
//! ┌─────▼──────┐ ┌──────▼──────┐
//! │SystemRunner│ │ MockRunner  │
//! │ (gluster)  │ │ (Testing)   │
//! └────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use glustat_core::collector::{GlusterCollector, SystemRunner};
//! use glustat_core::config::GlusterConfig;
//! use glustat_core::sink::Accumulator;
//!
//! let collector = GlusterCollector::new(SystemRunner::new(), GlusterConfig::default());
//! let mut acc = Accumulator::new();
//! collector.gather(&mut acc)?;
//! ```
//!
//! ## Testing (with MockRunner)
//!
//! ```
//! use glustat_core::collector::{GlusterCollector, MockRunner};
//! use glustat_core::config::GlusterConfig;
//! use glustat_core::sink::Accumulator;
//!
//! let collector = GlusterCollector::new(MockRunner::typical_cluster(), GlusterConfig::default());
//! let mut acc = Accumulator::new();
//! collector.gather(&mut acc).unwrap();
//! assert!(!acc.records.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod profile;
pub mod traits;

pub use collector::{CollectError, GatherSummary, GlusterCollector};
pub use mock::MockRunner;
pub use profile::{FieldParseError, ReportScanner, ScanEvent, scan};
pub use traits::{CommandError, CommandErrorKind, CommandRunner, SystemRunner};
