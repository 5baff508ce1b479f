//! Stochastic fitness simulation.
//!
//! Records how each entity's weighted score drifts when every indicator is
//! repeatedly perturbed with Gaussian noise. This is a sensitivity
//! visualization, not an optimizer: nothing is selected or mutated toward a
//! fitness peak.

use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::foundation::EngineError;

/// Standard deviation of the per-cell perturbation applied each iteration.
pub const PERTURBATION_STD: f64 = 0.1;

/// Default iteration count for one simulation run.
pub const DEFAULT_ITERATIONS: usize = 50;

/// An `iterations x entities` fitness trajectory. Append-only during the run,
/// read-only afterward.
#[derive(Debug, Clone)]
pub struct FitnessTrace {
    values: Array2<f64>,
}

impl FitnessTrace {
    pub fn iterations(&self) -> usize {
        self.values.nrows()
    }

    pub fn entity_count(&self) -> usize {
        self.values.ncols()
    }

    /// Fitness of every entity at one iteration, in roster order.
    pub fn row(&self, iteration: usize) -> Vec<f64> {
        self.values.row(iteration).to_vec()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.values.nrows()).map(|i| self.row(i)).collect()
    }
}

/// Runs the perturbation simulation over an indicator matrix.
///
/// Iteration 0 records the unperturbed scores `X . w`; each subsequent
/// iteration perturbs every cell with `Normal(0, PERTURBATION_STD)` noise
/// before scoring again. Determinism follows the supplied random source, so
/// reproducible runs need a seeded `rng`.
pub fn simulate_fitness<R: Rng>(
    indicators: &Array2<f64>,
    weights: &Array1<f64>,
    iterations: usize,
    rng: &mut R,
) -> Result<FitnessTrace, EngineError> {
    if weights.len() != indicators.ncols() {
        return Err(EngineError::dimension(format!(
            "weight vector has length {}, expected indicator dimensionality {}",
            weights.len(),
            indicators.ncols()
        )));
    }
    if iterations == 0 {
        return Err(EngineError::dimension(
            "simulation requires at least 1 iteration",
        ));
    }

    let noise = Normal::new(0.0, PERTURBATION_STD)
        .map_err(|e| EngineError::internal(format!("invalid noise distribution: {}", e)))?;

    let mut current = indicators.clone();
    let mut values = Array2::zeros((iterations, indicators.nrows()));
    for it in 0..iterations {
        let fitness = current.dot(weights);
        values.row_mut(it).assign(&fitness);
        if it + 1 < iterations {
            current.mapv_inplace(|x| x + noise.sample(rng));
        }
    }

    Ok(FitnessTrace { values })
}
