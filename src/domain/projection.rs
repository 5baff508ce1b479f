//! Principal-component projection.
//!
//! Projects standardized indicator matrices onto the top-k directions of
//! maximal variance. Eigenpairs of the covariance matrix are extracted by
//! power iteration with deflation, so no external linear-algebra backend is
//! needed and the projection is fully deterministic.

use ndarray::{Array1, Array2, Axis};

use super::foundation::EngineError;

const POWER_ITERATIONS: usize = 300;

/// Result of projecting a roster into `k` principal components.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Projected coordinates, `n x k`.
    pub coordinates: Array2<f64>,
    /// Loading vectors, `k x dim`.
    pub loadings: Array2<f64>,
    /// Fraction of total variance captured per component, each <= 1.
    pub explained_variance_ratio: Vec<f64>,
    /// Running sum of the ratios.
    pub cumulative_variance: Vec<f64>,
    /// Display labels embedding the variance percentage. Metadata only;
    /// nothing downstream may compute with these.
    pub axis_labels: Vec<String>,
}

impl Projection {
    pub fn total_variance_explained(&self) -> f64 {
        self.cumulative_variance.last().copied().unwrap_or(0.0)
    }
}

/// Fits a principal-component projection on a standardized matrix.
///
/// `x` is expected to be standardized already; the function itself only
/// centers defensively. Fails with a dimension error when `k` is outside
/// `1..=dim` and with an insufficient-data error when fewer than two rows
/// are supplied.
pub fn project(x: &Array2<f64>, k: usize) -> Result<Projection, EngineError> {
    let (n, dim) = x.dim();
    if n < 2 {
        return Err(EngineError::too_few_entities("principal-component projection", 2, n));
    }
    if k < 1 || k > dim {
        return Err(EngineError::dimension(format!(
            "component count {} is outside the valid range 1..={}",
            k, dim
        )));
    }

    let mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| EngineError::internal("mean of empty axis"))?;
    let centered = x - &mean;
    let covariance = centered.t().dot(&centered) / (n - 1) as f64;
    let total_variance: f64 = covariance.diag().sum();

    let (eigenvalues, eigenvectors) = symmetric_eigen_topk(&covariance, k);

    let mut loadings = Array2::zeros((k, dim));
    for j in 0..k {
        loadings.row_mut(j).assign(&eigenvectors.column(j));
    }
    let coordinates = centered.dot(&loadings.t());

    let explained_variance_ratio: Vec<f64> = eigenvalues
        .iter()
        .map(|&ev| {
            if total_variance > 0.0 {
                (ev / total_variance).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect();
    let cumulative_variance: Vec<f64> = explained_variance_ratio
        .iter()
        .scan(0.0, |acc, &r| {
            *acc += r;
            Some(acc.min(1.0))
        })
        .collect();

    let axis_labels = explained_variance_ratio
        .iter()
        .enumerate()
        .map(|(i, &r)| format!("PC{} ({:.1}% variance)", i + 1, r * 100.0))
        .collect();

    Ok(Projection {
        coordinates,
        loadings,
        explained_variance_ratio,
        cumulative_variance,
        axis_labels,
    })
}

/// Top-k eigenpairs of a symmetric positive-semidefinite matrix via power
/// iteration with deflation.
///
/// The start vector is deterministic so repeated projections of the same
/// data agree exactly. Components whose deflated matrix has (numerically)
/// no remaining energy come back with eigenvalue 0.
fn symmetric_eigen_topk(a: &Array2<f64>, k: usize) -> (Vec<f64>, Array2<f64>) {
    let n = a.nrows();
    let k = k.min(n);
    let mut eigenvalues = Vec::with_capacity(k);
    let mut eigenvectors = Array2::zeros((n, k));
    let mut deflated = a.clone();

    for j in 0..k {
        // Deterministic, non-uniform start vector; the tilt keeps it from
        // being orthogonal to the dominant direction of typical inputs.
        let mut v = Array1::from_shape_fn(n, |i| 1.0 + (i as f64 + 1.0) * 1e-3);
        let norm = v.dot(&v).sqrt();
        v /= norm;

        for _ in 0..POWER_ITERATIONS {
            let av = deflated.dot(&v);
            let norm = av.dot(&av).sqrt();
            if norm < 1e-15 {
                break;
            }
            v = av / norm;
        }

        let eigenvalue = v.dot(&deflated.dot(&v)).max(0.0);
        eigenvalues.push(eigenvalue);
        eigenvectors.column_mut(j).assign(&v);

        let vc = v.clone().insert_axis(Axis(1));
        let vr = v.insert_axis(Axis(0));
        let vvt = vc.dot(&vr);
        deflated = &deflated - &(&vvt * eigenvalue);
    }

    (eigenvalues, eigenvectors)
}
