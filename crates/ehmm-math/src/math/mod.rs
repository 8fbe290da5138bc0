//! Numeric building blocks shared by the ehmm crates.

pub mod simplex;
pub mod tensor;
