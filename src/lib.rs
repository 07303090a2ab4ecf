//! `dist-conformance` library crate.
//!
//! The binary (`gof`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the tester can be embedded by other hosts (see `router`)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod gof;
pub mod io;
pub mod math;
pub mod registry;
pub mod report;
pub mod router;
pub mod tester;

pub use domain::{OutcomeEntry, TestOutcome, TesterConfig};
pub use error::TestError;
pub use tester::Tester;
