//! Goodness-of-fit tests.
//!
//! - `normality`: D'Agostino–Pearson omnibus test (parameter-free)
//! - `ks`: one-sample Kolmogorov–Smirnov against a fitted continuous CDF
//! - `chisquare`: Pearson chi-square on binned counts for discrete families

pub mod chisquare;
pub mod ks;
pub mod normality;

pub use chisquare::*;
pub use ks::*;
pub use normality::*;
