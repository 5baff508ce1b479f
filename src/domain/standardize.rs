//! Zero-mean, unit-variance feature scaling.
//!
//! Shared preprocessing for projection, clustering and neural scoring.
//! Statistics are fitted from the input itself; there is no held-out
//! reference set.

use ndarray::{Array1, Array2, Axis};

use super::foundation::EngineError;

/// Per-column standardization fitted on one matrix.
///
/// Columns with zero variance are left at exactly 0 after transformation
/// instead of dividing by zero. The fitted mean/std are kept so predictions
/// can be mapped back to the original scale.
#[derive(Debug, Clone)]
pub struct Standardizer {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl Standardizer {
    /// Fits column statistics. Population standard deviation, matching the
    /// usual fit-transform scalers.
    pub fn fit(x: &Array2<f64>) -> Result<Self, EngineError> {
        if x.nrows() < 2 {
            return Err(EngineError::too_few_entities("standardization", 2, x.nrows()));
        }
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| EngineError::internal("mean of empty axis"))?;
        let std = x.std_axis(Axis(0), 0.0);
        Ok(Self { mean, std })
    }

    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>), EngineError> {
        let scaler = Self::fit(x)?;
        let transformed = scaler.transform(x);
        Ok((scaler, transformed))
    }

    /// Applies `(x - mean) / std`, leaving zero-variance columns at 0.
    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = x.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let std = self.std[j];
            if std > 0.0 {
                column.mapv_inplace(|v| (v - self.mean[j]) / std);
            } else {
                column.fill(0.0);
            }
        }
        out
    }

    /// Maps standardized values back to the original scale.
    pub fn inverse_transform_column(&self, values: &Array1<f64>, column: usize) -> Array1<f64> {
        values.mapv(|v| v * self.std[column] + self.mean[column])
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }
}

/// Standardization for a 1-D target vector, used by the neural scorer to
/// scale targets independently of the inputs.
#[derive(Debug, Clone)]
pub struct TargetScaler {
    mean: f64,
    std: f64,
}

impl TargetScaler {
    pub fn fit(y: &Array1<f64>) -> Result<Self, EngineError> {
        if y.len() < 2 {
            return Err(EngineError::too_few_entities("standardization", 2, y.len()));
        }
        let mean = y.mean().unwrap_or(0.0);
        let std = y.std(0.0);
        Ok(Self { mean, std })
    }

    pub fn transform(&self, y: &Array1<f64>) -> Array1<f64> {
        if self.std > 0.0 {
            y.mapv(|v| (v - self.mean) / self.std)
        } else {
            Array1::zeros(y.len())
        }
    }

    pub fn inverse_transform(&self, y: &Array1<f64>) -> Array1<f64> {
        y.mapv(|v| v * self.std + self.mean)
    }

    /// The fitted standard deviation, for rescaling derived quantities such
    /// as attribution scores back to target units.
    pub fn scale(&self) -> f64 {
        self.std
    }
}
