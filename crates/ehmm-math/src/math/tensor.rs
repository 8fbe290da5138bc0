//! Dense, explicitly-sized matrix and rank-3 tensor value types.
//!
//! Storage is row-major `Vec<f64>` behind a checked index surface. These are
//! deliberately minimal: the HMM core needs zero-initialized allocation,
//! per-row slice access (each row of a stochastic matrix is a probability
//! simplex), and element-wise squared-difference accumulation for the
//! convergence metric. No linear algebra beyond that.

use serde::{Deserialize, Serialize};

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Allocate a zero-filled `rows` x `cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Read one cell. Panics on an out-of-range index; callers that take
    /// indices from outside the crate must validate first.
    pub fn get(&self, r: usize, c: usize) -> f64 {
        assert!(r < self.rows && c < self.cols, "matrix index out of range");
        self.data[r * self.cols + c]
    }

    /// Write one cell. Panics on an out-of-range index.
    pub fn set(&mut self, r: usize, c: usize, value: f64) {
        assert!(r < self.rows && c < self.cols, "matrix index out of range");
        self.data[r * self.cols + c] = value;
    }

    /// Borrow row `r` as a slice.
    pub fn row(&self, r: usize) -> &[f64] {
        assert!(r < self.rows, "matrix row out of range");
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Borrow row `r` mutably.
    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        assert!(r < self.rows, "matrix row out of range");
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Sum of squared element-wise differences against a same-shaped matrix.
    pub fn squared_diff(&self, other: &Matrix) -> f64 {
        assert!(
            self.rows == other.rows && self.cols == other.cols,
            "matrix shape mismatch"
        );
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum()
    }
}

/// Dense row-major rank-3 tensor of `f64`.
///
/// Indexed `[i][j][k]` with `i < d0`, `j < d1`, `k < d2`; the innermost
/// `d2`-length rows are the simplex rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor3 {
    d0: usize,
    d1: usize,
    d2: usize,
    data: Vec<f64>,
}

impl Tensor3 {
    /// Allocate a zero-filled `d0` x `d1` x `d2` tensor.
    pub fn zeros(d0: usize, d1: usize, d2: usize) -> Self {
        Self {
            d0,
            d1,
            d2,
            data: vec![0.0; d0 * d1 * d2],
        }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.d0, self.d1, self.d2)
    }

    /// Read one cell. Panics on an out-of-range index.
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        assert!(
            i < self.d0 && j < self.d1 && k < self.d2,
            "tensor index out of range"
        );
        self.data[(i * self.d1 + j) * self.d2 + k]
    }

    /// Write one cell. Panics on an out-of-range index.
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        assert!(
            i < self.d0 && j < self.d1 && k < self.d2,
            "tensor index out of range"
        );
        self.data[(i * self.d1 + j) * self.d2 + k] = value;
    }

    /// Borrow the innermost row `[i][j][..]` as a slice.
    pub fn row(&self, i: usize, j: usize) -> &[f64] {
        assert!(i < self.d0 && j < self.d1, "tensor row out of range");
        let base = (i * self.d1 + j) * self.d2;
        &self.data[base..base + self.d2]
    }

    /// Borrow the innermost row `[i][j][..]` mutably.
    pub fn row_mut(&mut self, i: usize, j: usize) -> &mut [f64] {
        assert!(i < self.d0 && j < self.d1, "tensor row out of range");
        let base = (i * self.d1 + j) * self.d2;
        &mut self.data[base..base + self.d2]
    }

    /// Sum of squared element-wise differences against a same-shaped tensor.
    pub fn squared_diff(&self, other: &Tensor3) -> f64 {
        assert!(
            self.dims() == other.dims(),
            "tensor shape mismatch"
        );
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_zeros_and_set_get() {
        let mut m = Matrix::zeros(2, 3);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.get(1, 2), 0.0);
        m.set(1, 2, 0.5);
        assert_eq!(m.get(1, 2), 0.5);
        assert_eq!(m.row(1), &[0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_matrix_row_mut() {
        let mut m = Matrix::zeros(2, 2);
        m.row_mut(0).copy_from_slice(&[0.25, 0.75]);
        assert_eq!(m.get(0, 0), 0.25);
        assert_eq!(m.get(0, 1), 0.75);
        assert_eq!(m.row(1), &[0.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "matrix index out of range")]
    fn test_matrix_get_out_of_range_panics() {
        let m = Matrix::zeros(2, 2);
        m.get(2, 0);
    }

    #[test]
    fn test_matrix_squared_diff() {
        let mut a = Matrix::zeros(2, 2);
        let b = Matrix::zeros(2, 2);
        assert_eq!(a.squared_diff(&b), 0.0);
        a.set(0, 1, 3.0);
        a.set(1, 0, 4.0);
        assert!((a.squared_diff(&b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_tensor_rows_independent() {
        let mut t = Tensor3::zeros(2, 2, 3);
        t.row_mut(0, 1).copy_from_slice(&[0.1, 0.2, 0.7]);
        assert_eq!(t.get(0, 1, 2), 0.7);
        assert_eq!(t.row(1, 0), &[0.0, 0.0, 0.0]);
        assert_eq!(t.dims(), (2, 2, 3));
    }

    #[test]
    fn test_tensor_squared_diff() {
        let mut a = Tensor3::zeros(1, 2, 2);
        let b = Tensor3::zeros(1, 2, 2);
        a.set(0, 0, 0, 1.0);
        a.set(0, 1, 1, 2.0);
        assert!((a.squared_diff(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_sized_rows() {
        let m = Matrix::zeros(0, 4);
        assert_eq!(m.rows(), 0);
        let t = Tensor3::zeros(0, 3, 3);
        assert_eq!(t.dims(), (0, 3, 3));
    }
}
