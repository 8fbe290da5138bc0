//! Model parameters for a discrete HMM with transition-conditioned emissions.
//!
//! Unlike a textbook HMM, the emission distribution here is conditioned on
//! the *transition* (origin, destination) rather than the destination alone:
//!
//! - `a[i][j]  = P(move to state j | in state i)`
//! - `b[i][j][k] = P(emit symbol k | transition i -> j)`
//! - `pi[i]   = P(initial state = i)`
//!
//! Dimensions are fixed at construction. Each row of `a`, each `b[i][j]` row,
//! and `pi` is a probability simplex; the rows are re-established by
//! [`EdgeHmm::randomize_uniform`] and by the solver's re-estimation pass, and
//! cell setters store raw values so callers can assemble a model piecewise.

use ehmm_math::{categorical_index, normalize, is_distribution, Matrix, Tensor3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{HmmError, Result};

/// Row-sum tolerance for the debug-build stochasticity checks.
const ROW_SUM_TOL: f64 = 1e-6;

/// Parameters of an edge-emission HMM over `state_count` hidden states and
/// `observation_count` emission symbols.
///
/// Cloning produces a fully independent deep copy; the convergence loop in a
/// caller typically clones the model before a re-estimation sweep and feeds
/// both to [`EdgeHmm::parameter_distance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeHmm {
    state_count: usize,
    observation_count: usize,
    pub(crate) a: Matrix,
    pub(crate) b: Tensor3,
    pub(crate) pi: Vec<f64>,
}

impl EdgeHmm {
    /// Create a zero-initialized model. Both dimensions must be positive.
    pub fn new(state_count: usize, observation_count: usize) -> Result<Self> {
        if state_count == 0 || observation_count == 0 {
            return Err(HmmError::InvalidDimensions {
                states: state_count,
                symbols: observation_count,
            });
        }
        Ok(Self {
            state_count,
            observation_count,
            a: Matrix::zeros(state_count, state_count),
            b: Tensor3::zeros(state_count, state_count, observation_count),
            pi: vec![0.0; state_count],
        })
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn observation_count(&self) -> usize {
        self.observation_count
    }

    fn check_state(&self, field: &'static str, index: usize) -> Result<()> {
        if index >= self.state_count {
            return Err(HmmError::IndexOutOfRange {
                field,
                index,
                limit: self.state_count,
            });
        }
        Ok(())
    }

    fn check_symbol(&self, index: usize) -> Result<()> {
        if index >= self.observation_count {
            return Err(HmmError::IndexOutOfRange {
                field: "symbol",
                index,
                limit: self.observation_count,
            });
        }
        Ok(())
    }

    /// `P(transition i -> j)`.
    pub fn transition(&self, i: usize, j: usize) -> Result<f64> {
        self.check_state("origin state", i)?;
        self.check_state("destination state", j)?;
        Ok(self.a.get(i, j))
    }

    pub fn set_transition(&mut self, i: usize, j: usize, p: f64) -> Result<()> {
        self.check_state("origin state", i)?;
        self.check_state("destination state", j)?;
        self.a.set(i, j, p);
        Ok(())
    }

    /// `P(emit symbol k | transition i -> j)`.
    pub fn emission(&self, i: usize, j: usize, k: usize) -> Result<f64> {
        self.check_state("origin state", i)?;
        self.check_state("destination state", j)?;
        self.check_symbol(k)?;
        Ok(self.b.get(i, j, k))
    }

    pub fn set_emission(&mut self, i: usize, j: usize, k: usize, p: f64) -> Result<()> {
        self.check_state("origin state", i)?;
        self.check_state("destination state", j)?;
        self.check_symbol(k)?;
        self.b.set(i, j, k, p);
        Ok(())
    }

    /// `P(initial state = i)`.
    pub fn initial(&self, i: usize) -> Result<f64> {
        self.check_state("state", i)?;
        Ok(self.pi[i])
    }

    pub fn set_initial(&mut self, i: usize, p: f64) -> Result<()> {
        self.check_state("state", i)?;
        self.pi[i] = p;
        Ok(())
    }

    /// Fill `pi`, each row of `a`, and each `b[i][j]` row with independent
    /// uniform draws and normalize each to sum 1.
    ///
    /// Normalized-uniform draws are not a proper Dirichlet sample, but they
    /// are an adequate EM starting point.
    pub fn randomize_uniform(&mut self, rng: &mut impl Rng) {
        for p in self.pi.iter_mut() {
            *p = rng.random::<f64>();
        }
        normalize(&mut self.pi);
        for i in 0..self.state_count {
            let row = self.a.row_mut(i);
            for p in row.iter_mut() {
                *p = rng.random::<f64>();
            }
            normalize(row);
        }
        for i in 0..self.state_count {
            for j in 0..self.state_count {
                let row = self.b.row_mut(i, j);
                for p in row.iter_mut() {
                    *p = rng.random::<f64>();
                }
                normalize(row);
            }
        }
        self.debug_check_stochastic();
    }

    /// Sample an observation sequence of `length` symbols.
    ///
    /// The initial state is drawn from `pi` by inverse-CDF; each step draws
    /// the next state from `a[current]` and the emitted symbol from
    /// `b[current][next]`. Only the symbols are returned, not the state path.
    pub fn sample_observations(&self, length: usize, rng: &mut impl Rng) -> Vec<usize> {
        let mut out = Vec::with_capacity(length);
        let mut current = categorical_index(&self.pi, rng.random::<f64>());
        for _ in 0..length {
            let next = categorical_index(self.a.row(current), rng.random::<f64>());
            out.push(categorical_index(
                self.b.row(current, next),
                rng.random::<f64>(),
            ));
            current = next;
        }
        out
    }

    /// Emit one symbol per consecutive transition of `states`, producing
    /// `states.len() - 1` symbols (or none for paths shorter than 2).
    pub fn sample_observations_along(
        &self,
        states: &[usize],
        rng: &mut impl Rng,
    ) -> Result<Vec<usize>> {
        for &s in states {
            self.check_state("state", s)?;
        }
        let mut out = Vec::with_capacity(states.len().saturating_sub(1));
        for pair in states.windows(2) {
            out.push(categorical_index(
                self.b.row(pair[0], pair[1]),
                rng.random::<f64>(),
            ));
        }
        Ok(out)
    }

    /// Mean squared parameter difference against `other`: the sum of squared
    /// element-wise differences across `a`, `b`, and `pi`, divided by the
    /// total parameter count `N + N^2 + N^2*M`.
    ///
    /// Used as a scalar convergence signal between EM iterations; zero for a
    /// model compared against itself.
    pub fn parameter_distance(&self, other: &EdgeHmm) -> Result<f64> {
        if self.state_count != other.state_count
            || self.observation_count != other.observation_count
        {
            return Err(HmmError::DimensionMismatch {
                lhs_states: self.state_count,
                lhs_symbols: self.observation_count,
                rhs_states: other.state_count,
                rhs_symbols: other.observation_count,
            });
        }
        let n = self.state_count;
        let m = self.observation_count;
        let mut error = self.a.squared_diff(&other.a);
        error += self.b.squared_diff(&other.b);
        error += self
            .pi
            .iter()
            .zip(other.pi.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>();
        Ok(error / (n + n * n + n * n * m) as f64)
    }

    /// Debug-build check that every simplex row sums to 1.
    pub(crate) fn debug_check_stochastic(&self) {
        debug_assert!(
            is_distribution(&self.pi, ROW_SUM_TOL),
            "pi is not a distribution"
        );
        for i in 0..self.state_count {
            debug_assert!(
                is_distribution(self.a.row(i), ROW_SUM_TOL),
                "transition row {i} is not a distribution"
            );
            for j in 0..self.state_count {
                debug_assert!(
                    is_distribution(self.b.row(i, j), ROW_SUM_TOL),
                    "emission row ({i},{j}) is not a distribution"
                );
            }
        }
    }
}

/// The reference model from the original demo: 2 states, 4 symbols, each
/// symbol identifying exactly one transition edge.
#[cfg(test)]
pub(crate) fn reference_model() -> EdgeHmm {
    let mut hmm = EdgeHmm::new(2, 4).unwrap();
    hmm.set_transition(0, 0, 0.1).unwrap();
    hmm.set_transition(0, 1, 0.9).unwrap();
    hmm.set_transition(1, 0, 0.1).unwrap();
    hmm.set_transition(1, 1, 0.9).unwrap();
    hmm.set_emission(0, 0, 0, 1.0).unwrap();
    hmm.set_emission(1, 1, 1, 1.0).unwrap();
    hmm.set_emission(0, 1, 2, 1.0).unwrap();
    hmm.set_emission(1, 0, 3, 1.0).unwrap();
    hmm.set_initial(0, 0.9).unwrap();
    hmm.set_initial(1, 0.1).unwrap();
    hmm
}
