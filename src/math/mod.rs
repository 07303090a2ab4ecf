//! Numeric building blocks: moments, special functions, optimizers and the
//! Kolmogorov–Smirnov distribution.

pub mod kolmogorov;
pub mod moments;
pub mod optimize;
pub mod special;

pub use kolmogorov::*;
pub use moments::*;
pub use optimize::*;
pub use special::*;
