//! glustat-core — shared library for the glustat collector.
//!
//! Provides:
//! - `collector` — gluster command invocation, profile report parsing and
//!   the per-cycle collection loop
//! - `config` — collector configuration with documented defaults
//! - `models` — measurement records and tag sets
//! - `sink` — metrics sink abstraction and output writers
//! - `util` — helper utilities

pub mod collector;
pub mod config;
pub mod models;
pub mod sink;
pub mod util;
