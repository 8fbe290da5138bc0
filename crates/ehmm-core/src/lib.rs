//! Discrete-time, discrete-state HMM with transition-conditioned emissions.
//!
//! In this variant the emission distribution depends on the transition edge
//! (origin state, destination state) instead of the destination state alone:
//! `b[i][j][k] = P(emit k | i -> j)`. The crate provides:
//!
//! - [`EdgeHmm`] — the parameter model: transition matrix, edge-conditioned
//!   emission tensor, initial distribution; random initialization, generative
//!   sampling, and a mean-squared parameter-distance metric.
//! - [`ForwardBackward`] — the eager alpha/beta/gamma probability engine,
//!   bound to one (model, sequence) pair.
//! - [`HmmSolver`] — occupancy scoring, Viterbi decoding, and single-pass
//!   Baum-Welch re-estimation.
//!
//! Everything is synchronous and single-threaded. Convergence looping (clone,
//! sweep, measure [`EdgeHmm::parameter_distance`], repeat) belongs to the
//! caller; the `ehmm` demo binary shows the pattern.

pub mod error;
pub mod forward_backward;
pub mod model;
pub mod solver;

pub use error::{HmmError, Result};
pub use forward_backward::ForwardBackward;
pub use model::EdgeHmm;
pub use solver::HmmSolver;
