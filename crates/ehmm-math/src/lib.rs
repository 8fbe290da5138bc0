//! ehmm math utilities.

pub mod math;

pub use math::simplex::*;
pub use math::tensor::*;
