//! Solver for the three classical HMM questions.
//!
//! Binds one [`EdgeHmm`] to one observation sequence through an eager
//! [`ForwardBackward`] snapshot and answers: how well does the model explain
//! the sequence ([`HmmSolver::average_occupancy_score`]), what is the most
//! likely state path ([`HmmSolver::viterbi_decode`]), and how should the
//! parameters move to explain the data better ([`HmmSolver::reestimate`]).
//!
//! The solver owns its model, so parameter mutation has exactly one writer.
//! Convergence looping is the caller's job: a typical EM driver clones the
//! model, sweeps its training sequences with `rebind` + `reestimate`, and
//! stops when [`EdgeHmm::parameter_distance`] against the clone falls under a
//! threshold.

use ehmm_math::{Matrix, Tensor3};
use tracing::debug;

use crate::error::{HmmError, Result};
use crate::forward_backward::ForwardBackward;
use crate::model::EdgeHmm;

/// Seed added to slice normalizers and accumulator cells so later divisions
/// cannot hit an exact zero.
const EPS: f64 = 1e-15;

/// Additive smoothing applied to per-symbol emission counts.
const EMISSION_SMOOTHING: f64 = 1e-8;

/// One model bound to one observation sequence, with the forward-backward
/// snapshot kept in sync with both.
#[derive(Debug, Clone)]
pub struct HmmSolver {
    model: EdgeHmm,
    observations: Vec<usize>,
    fb: ForwardBackward,
}

impl HmmSolver {
    /// Bind `model` to `observations`, computing the snapshot eagerly.
    pub fn new(model: EdgeHmm, observations: &[usize]) -> Result<Self> {
        let fb = ForwardBackward::compute(&model, observations)?;
        Ok(Self {
            model,
            observations: observations.to_vec(),
            fb,
        })
    }

    /// Replace the bound sequence and recompute the snapshot.
    pub fn rebind(&mut self, observations: &[usize]) -> Result<()> {
        let fb = ForwardBackward::compute(&self.model, observations)?;
        self.observations = observations.to_vec();
        self.fb = fb;
        debug!(len = observations.len(), "solver rebound to new sequence");
        Ok(())
    }

    /// The bound model.
    pub fn model(&self) -> &EdgeHmm {
        &self.model
    }

    /// Consume the solver and take the model back.
    pub fn into_model(self) -> EdgeHmm {
        self.model
    }

    /// The bound observation sequence.
    pub fn observations(&self) -> &[usize] {
        &self.observations
    }

    /// The current forward-backward snapshot.
    pub fn engine(&self) -> &ForwardBackward {
        &self.fb
    }

    /// Time-averaged state-occupancy mass:
    /// `sum_{t=0..=T} sum_i alpha[t][i] * beta[t][i], divided by T + 1`.
    ///
    /// This is an average over time slices, not the textbook total sequence
    /// likelihood; the name reflects that. Without per-step scaling each
    /// slice carries the same total mass, so the value tracks the sequence
    /// probability while staying defined for empty sequences.
    pub fn average_occupancy_score(&self) -> f64 {
        let n = self.model.state_count();
        let t_end = self.observations.len();
        let mut total = 0.0;
        for t in 0..=t_end {
            for i in 0..n {
                total += self.fb.alpha().get(t, i) * self.fb.beta().get(t, i);
            }
        }
        total / (t_end + 1) as f64
    }

    /// Most likely state path given the bound sequence (Viterbi).
    ///
    /// Returns `T + 1` state indices: the slot before the first observation
    /// plus one per observation. Ties keep the first maximizing candidate in
    /// increasing state order; a later candidate wins only on strict
    /// improvement. For an empty sequence this is the argmax of `pi` alone.
    pub fn viterbi_decode(&self) -> Vec<usize> {
        let n = self.model.state_count();
        let t_end = self.observations.len();
        let o = &self.observations;

        // delta[t][i]: best path probability ending in state i at time t.
        // phi[t][i]: the predecessor state achieving it.
        let mut delta = Matrix::zeros(t_end + 1, n);
        let mut phi = vec![vec![0usize; n]; t_end + 1];
        for i in 0..n {
            delta.set(0, i, self.model.pi[i]);
        }
        for t in 1..=t_end {
            for i in 0..n {
                for j in 0..n {
                    let candidate = delta.get(t - 1, j)
                        * self.model.a.get(j, i)
                        * self.model.b.get(j, i, o[t - 1]);
                    if candidate > delta.get(t, i) {
                        delta.set(t, i, candidate);
                        phi[t][i] = j;
                    }
                }
            }
        }

        let mut path = vec![0usize; t_end + 1];
        for i in 1..n {
            if delta.get(t_end, i) > delta.get(t_end, path[t_end]) {
                path[t_end] = i;
            }
        }
        for t in (0..t_end).rev() {
            path[t] = phi[t + 1][path[t + 1]];
        }
        path
    }

    /// One Baum-Welch re-estimation pass.
    ///
    /// Computes the pairwise transition posterior
    /// `p[t][i][j] = alpha[t][i] * a[i][j] * b[i][j][o[t]] * beta[t+1][j]`,
    /// normalizes each time slice by its diagonal mass
    /// `sum_j p[t][j][j] + EPS`, and rebuilds `pi`, `a`, and `b` from the
    /// accumulated posteriors. Mutates the bound model in place and
    /// recomputes the forward-backward snapshot against it.
    ///
    /// The diagonal-only slice normalizer follows the system this implements;
    /// it is not the textbook full double sum.
    pub fn reestimate(&mut self) -> Result<()> {
        let n = self.model.state_count();
        let m = self.model.observation_count();
        let t_end = self.observations.len();
        let o = &self.observations;
        if t_end == 0 {
            return Err(HmmError::EmptySequence);
        }

        // Pairwise joint per time slice, normalized by the diagonal mass.
        let mut p = Tensor3::zeros(t_end, n, n);
        for t in 0..t_end {
            for i in 0..n {
                for j in 0..n {
                    let joint = self.fb.alpha().get(t, i)
                        * self.model.a.get(i, j)
                        * self.model.b.get(i, j, o[t])
                        * self.fb.beta().get(t + 1, j);
                    p.set(t, i, j, joint);
                }
            }
            let mut slice_norm = EPS;
            for j in 0..n {
                slice_norm += p.get(t, j, j);
            }
            for i in 0..n {
                for j in 0..n {
                    p.set(t, i, j, p.get(t, i, j) / slice_norm);
                }
            }
        }

        // Transition posteriors accumulated over time, seeded so the
        // divisions below never see an exact zero.
        let mut p_sum = Matrix::zeros(n, n);
        p_sum.fill(EPS);
        for t in 0..t_end {
            for i in 0..n {
                for j in 0..n {
                    p_sum.set(i, j, p_sum.get(i, j) + p.get(t, i, j));
                }
            }
        }

        // State posteriors rebuilt from the normalized joint.
        let mut gamma = Matrix::zeros(t_end, n);
        for t in 0..t_end {
            for i in 0..n {
                let mut acc = 0.0;
                for j in 0..n {
                    acc += p.get(t, i, j);
                }
                gamma.set(t, i, acc);
            }
        }

        // pi from the first-step posterior.
        let mut gamma_total = EPS;
        for i in 0..n {
            gamma_total += gamma.get(0, i);
        }
        for i in 0..n {
            self.model.pi[i] = gamma.get(0, i) / gamma_total;
        }

        // a from transition posteriors over occupancy.
        for i in 0..n {
            let mut occupancy = EPS;
            for t in 0..t_end {
                occupancy += gamma.get(t, i);
            }
            for j in 0..n {
                self.model.a.set(i, j, p_sum.get(i, j) / occupancy);
            }
        }

        // b from smoothed per-symbol counts of the transition posterior.
        for i in 0..n {
            for j in 0..n {
                let mut counts = vec![0.0; m];
                for t in 0..t_end {
                    counts[o[t]] += p.get(t, i, j);
                }
                for (k, &count) in counts.iter().enumerate() {
                    self.model
                        .b
                        .set(i, j, k, (count + EMISSION_SMOOTHING) / p_sum.get(i, j));
                }
            }
        }

        // The snapshot is stale against the mutated model; rebuild it.
        self.fb = ForwardBackward::compute(&self.model, &self.observations)?;
        debug!(len = t_end, states = n, "re-estimated model parameters");
        Ok(())
    }
}
