//! Sample sources: seeded synthetic generation.

pub mod synthetic;

pub use synthetic::*;
