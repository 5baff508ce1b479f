//! Analytics engine configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::Deadline;
use crate::domain::neural::{EXPLAIN_EPOCHS, TRAIN_EPOCHS};
use crate::domain::simulation::DEFAULT_ITERATIONS;

use super::error::ValidationError;

/// Tunables for the numerical engine
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Epochs for the scoring path
    #[serde(default = "default_train_epochs")]
    pub train_epochs: usize,

    /// Epochs for the explanation path
    #[serde(default = "default_explain_epochs")]
    pub explain_epochs: usize,

    /// Default fitness simulation iteration count
    #[serde(default = "default_simulation_iterations")]
    pub simulation_iterations: usize,

    /// K-means restarts per clustering call
    #[serde(default = "default_kmeans_restarts")]
    pub kmeans_restarts: usize,

    /// Wall-clock budget for a single compute call, in seconds
    #[serde(default = "default_compute_deadline")]
    pub compute_deadline_secs: u64,
}

impl EngineConfig {
    /// A fresh deadline covering one compute call
    pub fn deadline(&self) -> Deadline {
        Deadline::after(Duration::from_secs(self.compute_deadline_secs))
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.train_epochs == 0
            || self.train_epochs > 100_000
            || self.explain_epochs == 0
            || self.explain_epochs > 100_000
        {
            return Err(ValidationError::InvalidEpochBudget);
        }
        if self.simulation_iterations == 0 || self.simulation_iterations > 100_000 {
            return Err(ValidationError::InvalidIterationCount);
        }
        if self.kmeans_restarts == 0 || self.kmeans_restarts > 1_000 {
            return Err(ValidationError::InvalidRestartCount);
        }
        if self.compute_deadline_secs == 0 || self.compute_deadline_secs > 600 {
            return Err(ValidationError::InvalidComputeDeadline);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            train_epochs: default_train_epochs(),
            explain_epochs: default_explain_epochs(),
            simulation_iterations: default_simulation_iterations(),
            kmeans_restarts: default_kmeans_restarts(),
            compute_deadline_secs: default_compute_deadline(),
        }
    }
}

fn default_train_epochs() -> usize {
    TRAIN_EPOCHS
}

fn default_explain_epochs() -> usize {
    EXPLAIN_EPOCHS
}

fn default_simulation_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_kmeans_restarts() -> usize {
    10
}

fn default_compute_deadline() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.train_epochs, 500);
        assert_eq!(config.explain_epochs, 200);
        assert_eq!(config.simulation_iterations, 50);
        assert_eq!(config.kmeans_restarts, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_epochs() {
        let config = EngineConfig {
            train_epochs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_deadline() {
        let config = EngineConfig {
            compute_deadline_secs: 601,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deadline_is_live() {
        let config = EngineConfig::default();
        assert!(config.deadline().check().is_ok());
    }
}
