//! Probability-simplex helpers: normalization, validation, and inverse-CDF
//! categorical index selection.
//!
//! All functions here are deterministic; randomness stays with the caller,
//! which supplies the uniform draw to [`categorical_index`]. That keeps this
//! crate free of RNG state and makes every sampling path replayable in tests.

/// Normalize `values` in place so it sums to 1. Returns the pre-normalization
/// sum; when that sum is zero (or non-finite) the slice is left untouched and
/// the caller decides how to fail.
pub fn normalize(values: &mut [f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
    sum
}

/// Whether `values` is a valid probability distribution: every entry
/// non-negative and finite, total within `tol` of 1.
pub fn is_distribution(values: &[f64], tol: f64) -> bool {
    if values.is_empty() {
        return false;
    }
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return false;
    }
    (values.iter().sum::<f64>() - 1.0).abs() <= tol
}

/// Inverse-CDF selection over a pmf: subtract each entry from `r` and return
/// the first index where the remainder drops to or below zero.
///
/// `r` is expected in `[0, 1)`. If rounding leaves a positive remainder after
/// the last entry, the last index is returned. Panics on an empty pmf.
pub fn categorical_index(pmf: &[f64], r: f64) -> usize {
    assert!(!pmf.is_empty(), "cannot sample from an empty pmf");
    let mut remainder = r;
    for (i, &p) in pmf.iter().enumerate() {
        remainder -= p;
        if remainder <= 0.0 {
            return i;
        }
    }
    pmf.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_basic() {
        let mut v = [1.0, 3.0];
        let sum = normalize(&mut v);
        assert!((sum - 4.0).abs() < 1e-12);
        assert!((v[0] - 0.25).abs() < 1e-12);
        assert!((v[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_sum_untouched() {
        let mut v = [0.0, 0.0, 0.0];
        let sum = normalize(&mut v);
        assert_eq!(sum, 0.0);
        assert_eq!(v, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_is_distribution() {
        assert!(is_distribution(&[0.5, 0.5], 1e-9));
        assert!(!is_distribution(&[0.5, 0.6], 1e-9));
        assert!(!is_distribution(&[1.5, -0.5], 1e-9));
        assert!(!is_distribution(&[f64::NAN, 1.0], 1e-9));
        assert!(!is_distribution(&[], 1e-9));
    }

    #[test]
    fn test_categorical_index_point_mass() {
        let pmf = [0.0, 1.0, 0.0];
        // r = 0 crosses at the first entry it can: the zero-mass entry 0.
        assert_eq!(categorical_index(&pmf, 0.0), 0);
        assert_eq!(categorical_index(&pmf, 0.5), 1);
        assert_eq!(categorical_index(&pmf, 0.999), 1);
    }

    #[test]
    fn test_categorical_index_boundaries() {
        let pmf = [0.25, 0.25, 0.5];
        assert_eq!(categorical_index(&pmf, 0.1), 0);
        assert_eq!(categorical_index(&pmf, 0.25), 0);
        assert_eq!(categorical_index(&pmf, 0.3), 1);
        assert_eq!(categorical_index(&pmf, 0.9), 2);
    }

    #[test]
    fn test_categorical_index_rounding_fallback() {
        // Entries sum to slightly less than one; a draw past the total must
        // still land on the last index.
        let pmf = [0.3, 0.3, 0.3];
        assert_eq!(categorical_index(&pmf, 0.95), 2);
    }

    proptest! {
        #[test]
        fn prop_normalize_positive_sums_to_one(
            v in prop::collection::vec(1e-6..1e3f64, 1..32)
        ) {
            let mut v = v;
            normalize(&mut v);
            prop_assert!(is_distribution(&v, 1e-9));
        }

        #[test]
        fn prop_categorical_index_in_range(
            v in prop::collection::vec(0.0..1e3f64, 1..32),
            r in 0.0..1.0f64
        ) {
            let idx = categorical_index(&v, r);
            prop_assert!(idx < v.len());
        }

        #[test]
        fn prop_categorical_index_skips_leading_zero_mass(
            r in 1e-9..1.0f64,
            idx in 0usize..8
        ) {
            // A pmf with all mass at `idx` selects `idx` for any r > 0.
            let mut pmf = vec![0.0; 8];
            pmf[idx] = 1.0;
            prop_assert_eq!(categorical_index(&pmf, r), idx);
        }
    }
}
