//! Error types for the HMM core.
//!
//! Two failure classes exist, and every operation is otherwise
//! deterministic: precondition violations (bad indices, mismatched shapes)
//! and numerical degeneracy (a posterior normalizer reaching zero). Neither
//! is retryable.

use thiserror::Error;

/// Result type alias for HMM operations.
pub type Result<T> = std::result::Result<T, HmmError>;

/// Errors raised by model construction, the forward-backward engine, and the
/// solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HmmError {
    /// Model constructed with a zero state or symbol count.
    #[error("model dimensions must be positive, got {states} states and {symbols} symbols")]
    InvalidDimensions { states: usize, symbols: usize },

    /// An accessor or mutator index fell outside its declared range.
    #[error("{field} index {index} out of range (must be < {limit})")]
    IndexOutOfRange {
        field: &'static str,
        index: usize,
        limit: usize,
    },

    /// An observation symbol fell outside `[0, observation_count)`.
    #[error("observation symbol {symbol} at position {position} out of range (must be < {limit})")]
    SymbolOutOfRange {
        position: usize,
        symbol: usize,
        limit: usize,
    },

    /// Two models of different shapes were compared.
    #[error(
        "model dimension mismatch: {lhs_states}x{lhs_symbols} versus {rhs_states}x{rhs_symbols}"
    )]
    DimensionMismatch {
        lhs_states: usize,
        lhs_symbols: usize,
        rhs_states: usize,
        rhs_symbols: usize,
    },

    /// All posterior mass vanished at one time step: every outcome at that
    /// step has zero probability under the model.
    #[error("posterior normalizer is zero at time {time}; the bound sequence has no support under the model")]
    DegenerateNormalizer { time: usize },

    /// Baum-Welch re-estimation needs at least one observation.
    #[error("cannot re-estimate parameters from an empty observation sequence")]
    EmptySequence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HmmError::IndexOutOfRange {
            field: "state",
            index: 5,
            limit: 3,
        };
        assert_eq!(err.to_string(), "state index 5 out of range (must be < 3)");

        let err = HmmError::DegenerateNormalizer { time: 7 };
        assert!(err.to_string().contains("time 7"));
    }
}
