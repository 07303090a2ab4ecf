//! Parameter estimation for every supported family.
//!
//! Responsibilities:
//!
//! - maximum-likelihood fits for the continuous families (`continuous`)
//! - location profiling shared by lognorm / gamma / chi2 / weibull (`location`)
//! - support validation and closed-form estimates for count families (`discrete`)

pub mod continuous;
pub mod discrete;
pub mod location;

pub use continuous::*;
pub use discrete::*;
pub use location::*;
