//! Input/output helpers.
//!
//! - sample load/save in JSON or CSV (`sample`)
//! - result exports (JSON report / CSV rows) (`export`)

pub mod export;
pub mod sample;

pub use export::*;
pub use sample::*;
