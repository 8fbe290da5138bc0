//! Forward-backward probability engine.
//!
//! Computes the three coupled arrays for one (model, observation sequence)
//! pair:
//!
//! - `alpha[t][i] = P(o_1 .. o_{t-1}, X_t = i | model)` (forward)
//! - `beta[t][i]  = P(o_{t+1} .. o_T | X_t = i, model)` (backward)
//! - `gamma[t][i] = P(X_t = i | O, model)` (posterior)
//!
//! The snapshot is tied to the inputs it was computed from: whenever the
//! model or the sequence changes, the whole thing is recomputed, never
//! patched incrementally. No per-step scaling is applied, so probabilities
//! underflow for very long sequences; that is an accepted limitation of this
//! design.

use ehmm_math::Matrix;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{HmmError, Result};
use crate::model::EdgeHmm;

/// Eagerly computed alpha/beta/gamma snapshot for one (model, sequence) pair.
///
/// For a sequence of length `T` over `N` states, `alpha` and `beta` hold
/// `T + 1` rows of `N` entries and `gamma` holds `T` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardBackward {
    alpha: Matrix,
    beta: Matrix,
    gamma: Matrix,
}

impl ForwardBackward {
    /// Validate the sequence against the model and compute all three arrays.
    pub fn compute(hmm: &EdgeHmm, observations: &[usize]) -> Result<Self> {
        let n = hmm.state_count();
        let m = hmm.observation_count();
        for (position, &symbol) in observations.iter().enumerate() {
            if symbol >= m {
                return Err(HmmError::SymbolOutOfRange {
                    position,
                    symbol,
                    limit: m,
                });
            }
        }

        let t_end = observations.len();
        let alpha = Self::forward(hmm, observations, n, t_end);
        let beta = Self::backward(hmm, observations, n, t_end);
        let gamma = Self::posterior(&alpha, &beta, n, t_end)?;
        trace!(states = n, len = t_end, "forward-backward snapshot computed");

        Ok(Self { alpha, beta, gamma })
    }

    /// Forward recursion: `alpha[0][i] = pi[i]`, then
    /// `alpha[t][i] = sum_j alpha[t-1][j] * a[j][i] * b[j][i][o[t-1]]`.
    fn forward(hmm: &EdgeHmm, o: &[usize], n: usize, t_end: usize) -> Matrix {
        let mut alpha = Matrix::zeros(t_end + 1, n);
        for i in 0..n {
            alpha.set(0, i, hmm.pi[i]);
        }
        for t in 1..=t_end {
            for i in 0..n {
                let mut acc = 0.0;
                for j in 0..n {
                    acc += alpha.get(t - 1, j) * hmm.a.get(j, i) * hmm.b.get(j, i, o[t - 1]);
                }
                alpha.set(t, i, acc);
            }
        }
        alpha
    }

    /// Backward recursion: `beta[T][i] = 1`, then
    /// `beta[t][i] = sum_j beta[t+1][j] * a[i][j] * b[i][j][o[t]]`, with the
    /// destination sum over the full state range `j = 0..N`.
    fn backward(hmm: &EdgeHmm, o: &[usize], n: usize, t_end: usize) -> Matrix {
        let mut beta = Matrix::zeros(t_end + 1, n);
        for i in 0..n {
            beta.set(t_end, i, 1.0);
        }
        for t in (0..t_end).rev() {
            for i in 0..n {
                let mut acc = 0.0;
                for j in 0..n {
                    acc += beta.get(t + 1, j) * hmm.a.get(i, j) * hmm.b.get(i, j, o[t]);
                }
                beta.set(t, i, acc);
            }
        }
        beta
    }

    /// Posterior: `gamma[t][i] = alpha[t][i] * beta[t][i]`, normalized per
    /// time step. A zero normalizer means the sequence has no support under
    /// the model and is reported as a fatal error rather than left as NaN.
    fn posterior(alpha: &Matrix, beta: &Matrix, n: usize, t_end: usize) -> Result<Matrix> {
        let mut gamma = Matrix::zeros(t_end, n);
        for t in 0..t_end {
            let mut total = 0.0;
            for i in 0..n {
                let joint = alpha.get(t, i) * beta.get(t, i);
                gamma.set(t, i, joint);
                total += joint;
            }
            if total <= 0.0 {
                return Err(HmmError::DegenerateNormalizer { time: t });
            }
            for i in 0..n {
                gamma.set(t, i, gamma.get(t, i) / total);
            }
        }
        Ok(gamma)
    }

    /// Forward probabilities, `(T + 1) x N`.
    pub fn alpha(&self) -> &Matrix {
        &self.alpha
    }

    /// Backward probabilities, `(T + 1) x N`.
    pub fn beta(&self) -> &Matrix {
        &self.beta
    }

    /// Per-step state posteriors, `T x N`.
    pub fn gamma(&self) -> &Matrix {
        &self.gamma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reference_model;
    use ehmm_math::is_distribution;

    /// Two states that self-loop forever; state i emits symbol i on every
    /// edge it can take.
    fn deterministic_model() -> EdgeHmm {
        let mut hmm = EdgeHmm::new(2, 2).unwrap();
        hmm.set_transition(0, 0, 1.0).unwrap();
        hmm.set_transition(1, 1, 1.0).unwrap();
        hmm.set_emission(0, 0, 0, 1.0).unwrap();
        hmm.set_emission(1, 1, 1, 1.0).unwrap();
        hmm.set_initial(0, 1.0).unwrap();
        hmm
    }

    #[test]
    fn test_alpha_row_zero_is_pi() {
        let hmm = reference_model();
        let fb = ForwardBackward::compute(&hmm, &[0, 2, 1]).unwrap();
        assert_eq!(fb.alpha().row(0), &[0.9, 0.1]);
    }

    #[test]
    fn test_empty_sequence_shapes() {
        let hmm = reference_model();
        let fb = ForwardBackward::compute(&hmm, &[]).unwrap();
        assert_eq!(fb.alpha().rows(), 1);
        assert_eq!(fb.beta().rows(), 1);
        assert_eq!(fb.beta().row(0), &[1.0, 1.0]);
        assert_eq!(fb.gamma().rows(), 0);
    }

    #[test]
    fn test_symbol_out_of_range() {
        let hmm = reference_model();
        let err = ForwardBackward::compute(&hmm, &[0, 4]).unwrap_err();
        assert_eq!(
            err,
            HmmError::SymbolOutOfRange {
                position: 1,
                symbol: 4,
                limit: 4
            }
        );
    }

    #[test]
    fn test_deterministic_recursions() {
        // With everything deterministic the arrays are exactly 0/1 valued.
        let hmm = deterministic_model();
        let fb = ForwardBackward::compute(&hmm, &[0, 0, 0]).unwrap();
        for t in 0..=3 {
            assert_eq!(fb.alpha().get(t, 0), 1.0);
            assert_eq!(fb.alpha().get(t, 1), 0.0);
        }
        for t in 0..=3 {
            assert_eq!(fb.beta().get(t, 0), 1.0);
        }
        for t in 0..3 {
            assert_eq!(fb.gamma().row(t), &[1.0, 0.0]);
        }
    }

    #[test]
    fn test_backward_includes_state_zero_mass() {
        // pi puts all mass on state 1, and the only way to emit symbol 0 is
        // the 1 -> 0 edge. beta[0][1] must pick up that destination-0 term.
        let mut hmm = EdgeHmm::new(2, 2).unwrap();
        hmm.set_transition(0, 0, 1.0).unwrap();
        hmm.set_transition(1, 0, 1.0).unwrap();
        hmm.set_emission(0, 0, 0, 1.0).unwrap();
        hmm.set_emission(1, 0, 0, 1.0).unwrap();
        hmm.set_initial(1, 1.0).unwrap();
        let fb = ForwardBackward::compute(&hmm, &[0]).unwrap();
        assert_eq!(fb.beta().get(0, 1), 1.0);
        assert_eq!(fb.gamma().row(0), &[0.0, 1.0]);
    }

    #[test]
    fn test_gamma_rows_are_distributions() {
        let hmm = reference_model();
        let fb = ForwardBackward::compute(&hmm, &[2, 1, 1, 3, 0]).unwrap();
        for t in 0..5 {
            assert!(is_distribution(fb.gamma().row(t), 1e-9));
        }
    }

    #[test]
    fn test_hand_computed_alpha_step() {
        // Reference model, single observation o = 2 (the 0 -> 1 edge).
        // alpha[1][1] = alpha[0][0] * a[0][1] * b[0][1][2] = 0.9 * 0.9 * 1.
        let hmm = reference_model();
        let fb = ForwardBackward::compute(&hmm, &[2]).unwrap();
        assert!((fb.alpha().get(1, 1) - 0.81).abs() < 1e-12);
        assert_eq!(fb.alpha().get(1, 0), 0.0);
    }

    #[test]
    fn test_zero_support_sequence_is_degenerate() {
        // The deterministic model can never emit symbol 1.
        let hmm = deterministic_model();
        let err = ForwardBackward::compute(&hmm, &[1]).unwrap_err();
        assert_eq!(err, HmmError::DegenerateNormalizer { time: 0 });
    }
}
