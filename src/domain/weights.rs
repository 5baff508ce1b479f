//! Pairwise-comparison weight solving.
//!
//! Derives a normalized importance-weight vector from a square matrix of
//! pairwise ratio judgments by extracting its dominant eigenvector. The
//! all-ones matrix is the equal-weighting fallback used whenever the caller
//! supplies no judgments.

use ndarray::{Array1, Array2};

use super::foundation::EngineError;

const POWER_ITERATIONS: usize = 500;
const CONVERGENCE_TOL: f64 = 1e-12;

/// A positive pairwise-comparison matrix sized to a roster's dimensionality.
#[derive(Debug, Clone)]
pub struct PairwiseMatrix {
    values: Array2<f64>,
}

impl PairwiseMatrix {
    /// Validates a caller-supplied comparison matrix.
    ///
    /// The matrix must be square, match the indicator dimensionality, and be
    /// strictly positive. Reciprocal symmetry is not enforced: an
    /// inconsistent matrix is a legal input, its weights are simply not
    /// guaranteed non-negative once normalized. That behavior is kept as-is
    /// rather than clamped.
    pub fn new(rows: Vec<Vec<f64>>, dimensionality: usize) -> Result<Self, EngineError> {
        if rows.len() != dimensionality {
            return Err(EngineError::dimension(format!(
                "pairwise matrix has {} rows, expected {}",
                rows.len(),
                dimensionality
            )));
        }
        let mut values = Array2::zeros((dimensionality, dimensionality));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dimensionality {
                return Err(EngineError::dimension(format!(
                    "pairwise matrix row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    dimensionality
                )));
            }
            for (j, &value) in row.iter().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(EngineError::dimension(format!(
                        "pairwise matrix entry ({}, {}) must be positive, got {}",
                        i, j, value
                    )));
                }
                values[[i, j]] = value;
            }
        }
        Ok(Self { values })
    }

    /// The all-ones matrix: every indicator judged equally important.
    pub fn equal(dimensionality: usize) -> Self {
        Self {
            values: Array2::ones((dimensionality, dimensionality)),
        }
    }

    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    /// Derives the weight vector from the dominant eigenvector, normalized
    /// to sum to 1.
    ///
    /// For a positive matrix the dominant eigenpair is real and reachable by
    /// power iteration, so no general eigendecomposition is needed. The
    /// all-ones matrix yields the uniform vector `1/n`.
    pub fn solve_weights(&self) -> Result<Array1<f64>, EngineError> {
        let n = self.values.nrows();
        let mut v = Array1::from_elem(n, 1.0 / n as f64);

        for _ in 0..POWER_ITERATIONS {
            let next = self.values.dot(&v);
            let norm = next.dot(&next).sqrt();
            if norm < f64::EPSILON {
                return Err(EngineError::internal(
                    "pairwise matrix collapsed the weight iterate to zero",
                ));
            }
            let next = next / norm;
            let delta = (&next - &v).mapv(f64::abs).sum();
            v = next;
            if delta < CONVERGENCE_TOL {
                break;
            }
        }

        let sum = v.sum();
        if sum.abs() < f64::EPSILON {
            return Err(EngineError::internal(
                "dominant eigenvector sums to zero, weights are undefined",
            ));
        }
        Ok(v / sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn all_ones_matrix_gives_uniform_weights() {
        for n in 2..=8 {
            let weights = PairwiseMatrix::equal(n).solve_weights().unwrap();
            for &w in weights.iter() {
                assert!((w - 1.0 / n as f64).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn consistent_matrix_recovers_ratio_weights() {
        // w = (0.5, 0.25, 0.25) induces the consistent matrix m[i][j] = w_i / w_j.
        let w = [0.5, 0.25, 0.25];
        let rows: Vec<Vec<f64>> = (0..3)
            .map(|i| (0..3).map(|j| w[i] / w[j]).collect())
            .collect();
        let weights = PairwiseMatrix::new(rows, 3).unwrap().solve_weights().unwrap();
        for (computed, expected) in weights.iter().zip(w.iter()) {
            assert!((computed - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn rejects_non_square_matrix() {
        let err = PairwiseMatrix::new(vec![vec![1.0, 2.0]], 2).unwrap_err();
        assert_eq!(err.code(), "DIMENSION_MISMATCH");
    }

    #[test]
    fn rejects_size_mismatch_with_dimensionality() {
        let err = PairwiseMatrix::new(vec![vec![1.0]], 3).unwrap_err();
        assert_eq!(err.code(), "DIMENSION_MISMATCH");
    }

    #[test]
    fn rejects_non_positive_entries() {
        let err = PairwiseMatrix::new(vec![vec![1.0, 0.0], vec![1.0, 1.0]], 2).unwrap_err();
        assert!(format!("{}", err).contains("positive"));
    }

    proptest! {
        #[test]
        fn weights_always_sum_to_one(entries in prop::collection::vec(0.1f64..9.0, 9)) {
            let rows: Vec<Vec<f64>> = entries.chunks(3).map(|c| c.to_vec()).collect();
            let weights = PairwiseMatrix::new(rows, 3).unwrap().solve_weights().unwrap();
            prop_assert!((weights.sum() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn weights_invariant_under_symmetric_permutation(scale in 1.0f64..9.0) {
            // A consistent matrix and the same matrix with indicators 0 and 2
            // swapped must yield weights that are the same permutation.
            let w = [scale, 1.0, 2.0];
            let rows: Vec<Vec<f64>> = (0..3)
                .map(|i| (0..3).map(|j| w[i] / w[j]).collect())
                .collect();
            let perm = [2usize, 1, 0];
            let permuted: Vec<Vec<f64>> = perm
                .iter()
                .map(|&i| perm.iter().map(|&j| rows[i][j]).collect())
                .collect();

            let base = PairwiseMatrix::new(rows, 3).unwrap().solve_weights().unwrap();
            let swapped = PairwiseMatrix::new(permuted, 3).unwrap().solve_weights().unwrap();
            for (k, &p) in perm.iter().enumerate() {
                prop_assert!((swapped[k] - base[p]).abs() < 1e-8);
            }
        }
    }
}
