//! Domain types used throughout the tester.
//!
//! This module defines:
//!
//! - the closed family set (`FamilyId`) and the input `Sample`
//! - fitted parameters and goodness-of-fit outputs (`FittedParameters`, `TestOutcome`, etc.)
//! - tester configuration (`TesterConfig`)

pub mod types;

pub use types::*;
