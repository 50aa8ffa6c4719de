//! Labeled weight matrix, the network itself.

use ndarray::Array2;

/// A weighted network with labeled dimensions.
///
/// Invariants, enforced by the builder:
/// - `weights.nrows() == row_labels.len()` and
///   `weights.ncols() == col_labels.len()`
/// - one-mode output is symmetric with a zero diagonal (self-ties excluded)
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub weights: Array2<f64>,
    pub one_mode: bool,
    pub symmetric: bool,
}

impl Matrix {
    pub fn new(row_labels: Vec<String>, col_labels: Vec<String>, one_mode: bool) -> Self {
        let weights = Array2::zeros((row_labels.len(), col_labels.len()));
        Self { row_labels, col_labels, weights, one_mode, symmetric: one_mode }
    }

    /// Weight by label pair; `None` when either label is absent.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.row_labels.iter().position(|l| l == row)?;
        let j = self.col_labels.iter().position(|l| l == col)?;
        Some(self.weights[[i, j]])
    }

    /// True when the stored flags match the actual shape and contents.
    pub fn check_invariants(&self) -> bool {
        if self.weights.nrows() != self.row_labels.len()
            || self.weights.ncols() != self.col_labels.len()
        {
            return false;
        }
        if self.one_mode {
            let n = self.row_labels.len();
            if self.row_labels != self.col_labels {
                return false;
            }
            for i in 0..n {
                if self.weights[[i, i]] != 0.0 {
                    return false;
                }
                for k in (i + 1)..n {
                    if self.weights[[i, k]] != self.weights[[k, i]] {
                        return false;
                    }
                }
            }
        }
        true
    }
}
