//! SimulateHandler - fitness drift simulation under indicator perturbation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::domain::foundation::EngineError;
use crate::domain::roster::{Entity, Roster};
use crate::domain::simulation::simulate_fitness;
use crate::domain::weights::PairwiseMatrix;

/// Command to run one fitness simulation.
#[derive(Debug, Clone)]
pub struct SimulateCommand {
    pub entities: Vec<Entity>,
    /// Pairwise ratio judgments over the indicators; equal weighting when
    /// absent.
    pub pairwise_matrix: Option<Vec<Vec<f64>>>,
    /// Iteration count; the configured default when absent.
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
}

/// Final standing of one entity after the simulation.
#[derive(Debug, Clone, Serialize)]
pub struct EntityStanding {
    pub name: String,
    pub initial_fitness: f64,
    pub final_fitness: f64,
}

/// View of a completed simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulateView {
    pub entity_names: Vec<String>,
    /// Derived indicator weights, summing to 1.
    pub weights: Vec<f64>,
    /// `iterations` rows of per-entity fitness, in roster order.
    pub trajectory: Vec<Vec<f64>>,
    pub iterations: usize,
    pub standings: Vec<EntityStanding>,
}

/// Entity floor for the simulation path: a one-entity trace has nothing to
/// compare drift against.
pub const MIN_SIMULATION_ENTITIES: usize = 2;

/// Handler for the fitness-simulation operation.
pub struct SimulateHandler {
    config: EngineConfig,
}

impl SimulateHandler {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn handle(&self, cmd: SimulateCommand) -> Result<SimulateView, EngineError> {
        let roster = Roster::new(cmd.entities)?;
        if roster.len() < MIN_SIMULATION_ENTITIES {
            return Err(EngineError::too_few_entities(
                "fitness simulation",
                MIN_SIMULATION_ENTITIES,
                roster.len(),
            ));
        }
        let dim = roster.dimensionality();

        let matrix = match cmd.pairwise_matrix {
            Some(rows) => PairwiseMatrix::new(rows, dim)?,
            None => PairwiseMatrix::equal(dim),
        };
        let weights = matrix.solve_weights()?;

        let iterations = cmd.iterations.unwrap_or(self.config.simulation_iterations);

        let mut rng = match cmd.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let trace = simulate_fitness(&roster.indicator_matrix(), &weights, iterations, &mut rng)?;

        let first = trace.row(0);
        let last = trace.row(trace.iterations() - 1);
        let standings = roster
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| EntityStanding {
                name: name.to_string(),
                initial_fitness: first[i],
                final_fitness: last[i],
            })
            .collect();

        Ok(SimulateView {
            entity_names: roster.names().iter().map(|s| s.to_string()).collect(),
            weights: weights.to_vec(),
            trajectory: trace.to_rows(),
            iterations: trace.iterations(),
            standings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> SimulateHandler {
        SimulateHandler::new(EngineConfig::default())
    }

    fn roster_of(n: usize, dim: usize) -> Vec<Entity> {
        (0..n)
            .map(|i| {
                Entity::new(
                    format!("ip-{}", i),
                    "",
                    (0..dim).map(|j| (i + j + 1) as f64).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn equal_weighting_is_the_default() {
        let view = handler()
            .handle(SimulateCommand {
                entities: roster_of(3, 4),
                pairwise_matrix: None,
                iterations: Some(10),
                seed: Some(5),
            })
            .unwrap();

        assert_eq!(view.weights.len(), 4);
        for &w in &view.weights {
            assert!((w - 0.25).abs() < 1e-9);
        }
        assert_eq!(view.trajectory.len(), 10);
        assert_eq!(view.iterations, 10);
        assert_eq!(view.standings.len(), 3);
    }

    #[test]
    fn first_row_matches_initial_standings() {
        let view = handler()
            .handle(SimulateCommand {
                entities: roster_of(4, 2),
                pairwise_matrix: None,
                iterations: Some(6),
                seed: Some(8),
            })
            .unwrap();
        for (i, standing) in view.standings.iter().enumerate() {
            assert_eq!(standing.initial_fitness, view.trajectory[0][i]);
            assert_eq!(standing.final_fitness, view.trajectory[5][i]);
        }
    }

    #[test]
    fn pairwise_judgments_shift_the_weights() {
        // Indicator 0 judged three times as important as indicator 1.
        let view = handler()
            .handle(SimulateCommand {
                entities: roster_of(3, 2),
                pairwise_matrix: Some(vec![vec![1.0, 3.0], vec![1.0 / 3.0, 1.0]]),
                iterations: Some(5),
                seed: Some(5),
            })
            .unwrap();
        assert!((view.weights[0] - 0.75).abs() < 1e-6);
        assert!((view.weights[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn same_seed_reproduces_trajectory() {
        let cmd = SimulateCommand {
            entities: roster_of(3, 3),
            pairwise_matrix: None,
            iterations: Some(20),
            seed: Some(77),
        };
        let a = handler().handle(cmd.clone()).unwrap();
        let b = handler().handle(cmd).unwrap();
        assert_eq!(a.trajectory, b.trajectory);
    }

    #[test]
    fn rejects_mis_sized_pairwise_matrix() {
        let err = handler()
            .handle(SimulateCommand {
                entities: roster_of(3, 3),
                pairwise_matrix: Some(vec![vec![1.0, 2.0], vec![0.5, 1.0]]),
                iterations: Some(5),
                seed: Some(1),
            })
            .unwrap_err();
        assert_eq!(err.code(), "DIMENSION_MISMATCH");
    }

    #[test]
    fn rejects_single_entity_roster() {
        let err = handler()
            .handle(SimulateCommand {
                entities: roster_of(1, 3),
                pairwise_matrix: None,
                iterations: Some(5),
                seed: Some(1),
            })
            .unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_DATA");
        assert_eq!(
            format!("{}", err),
            "fitness simulation requires at least 2 entities, got 1"
        );
    }

    #[test]
    fn rejects_zero_iterations() {
        let err = handler()
            .handle(SimulateCommand {
                entities: roster_of(3, 2),
                pairwise_matrix: None,
                iterations: Some(0),
                seed: Some(1),
            })
            .unwrap_err();
        assert!(err.is_client_error());
    }
}
