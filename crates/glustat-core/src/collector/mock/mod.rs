//! Mock gluster CLI for tests.

mod runner;
pub mod scenarios;

pub use runner::MockRunner;
