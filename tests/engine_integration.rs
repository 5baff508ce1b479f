//! Integration tests for the analytics engine.
//!
//! These drive full rosters through the application-layer handlers exactly
//! the way the HTTP adapter does, covering the happy paths and the
//! validation failures a client can trigger.

use std::sync::Arc;

use ip_analytics::application::handlers::{
    ClusterCommand, ClusterHandler, ExplainCommand, ExplainHandler, ReduceCommand, ReduceHandler,
    SimulateCommand, SimulateHandler, TrainScoreCommand, TrainScoreHandler,
};
use ip_analytics::config::EngineConfig;
use ip_analytics::domain::neural::AdamTrainer;
use ip_analytics::domain::roster::Entity;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn fast_engine_config() -> EngineConfig {
    EngineConfig {
        train_epochs: 50,
        explain_epochs: 50,
        ..Default::default()
    }
}

/// A roster of cultural and sports programs with five indicators each:
/// heritage depth, audience reach, media presence, revenue, growth.
fn program_roster() -> Vec<Entity> {
    vec![
        Entity::new("peking-opera", "heritage", vec![95.0, 42.0, 38.0, 30.0, 12.0]),
        Entity::new("dragon-boat", "sports", vec![80.0, 65.0, 55.0, 45.0, 40.0]),
        Entity::new("esports-league", "sports", vec![15.0, 90.0, 92.0, 85.0, 88.0]),
        Entity::new("shadow-puppetry", "heritage", vec![92.0, 25.0, 20.0, 15.0, 8.0]),
        Entity::new("city-marathon", "sports", vec![35.0, 78.0, 70.0, 60.0, 55.0]),
        Entity::new("tea-ceremony", "heritage", vec![88.0, 48.0, 35.0, 40.0, 25.0]),
        Entity::new("winter-games", "sports", vec![45.0, 85.0, 80.0, 75.0, 65.0]),
        Entity::new("folk-music", "heritage", vec![85.0, 38.0, 30.0, 22.0, 18.0]),
    ]
}

fn feature_names() -> Vec<String> {
    ["heritage", "reach", "media", "revenue", "growth"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// =============================================================================
// Training
// =============================================================================

#[test]
fn training_pipeline_scores_a_full_roster() {
    let handler = TrainScoreHandler::new(Arc::new(AdamTrainer), fast_engine_config());
    let view = handler
        .handle(TrainScoreCommand {
            entities: program_roster(),
            feature_names: Some(feature_names()),
            seed: Some(2024),
        })
        .unwrap();

    assert_eq!(view.scores.len(), 8);
    assert_eq!(view.losses.len(), 50);
    assert!(view.final_loss.is_finite());
    assert!(!view.feature_names_substituted);
    assert_eq!(view.feature_importance.len(), 5);
    assert_eq!(view.feature_importance[1].feature, "reach");

    // Loss should not diverge over the run.
    assert!(view.losses[49] <= view.losses[0] * 10.0);
}

#[test]
fn training_rejects_a_four_entity_roster() {
    let handler = TrainScoreHandler::new(Arc::new(AdamTrainer), fast_engine_config());
    let err = handler
        .handle(TrainScoreCommand {
            entities: program_roster().into_iter().take(4).collect(),
            feature_names: None,
            seed: Some(1),
        })
        .unwrap_err();

    assert!(err.is_client_error());
    assert_eq!(err.code(), "INSUFFICIENT_DATA");
}

// =============================================================================
// Explanation
// =============================================================================

#[test]
fn explanation_pipeline_attributes_every_feature() {
    let handler = ExplainHandler::new(Arc::new(AdamTrainer), fast_engine_config());
    let view = handler
        .handle(ExplainCommand {
            entities: program_roster(),
            feature_names: Some(feature_names()),
            seed: Some(7),
        })
        .unwrap();

    assert_eq!(view.entities.len(), 8);
    for entity in &view.entities {
        assert_eq!(entity.attributions.len(), 5);
        assert!(entity.attributions.iter().all(|v| v.is_finite()));
        assert!(entity.prediction.is_finite());
    }
    assert_eq!(view.features.len(), 5);
    assert!(view.features.iter().all(|f| f.mean_abs_attribution >= 0.0));
}

#[test]
fn explanation_works_at_the_minimum_roster_size() {
    let handler = ExplainHandler::new(Arc::new(AdamTrainer), fast_engine_config());
    let view = handler
        .handle(ExplainCommand {
            entities: program_roster().into_iter().take(3).collect(),
            feature_names: None,
            seed: Some(3),
        })
        .unwrap();

    assert_eq!(view.entities.len(), 3);
    assert!(view.feature_names_substituted);
}

// =============================================================================
// Projection
// =============================================================================

#[test]
fn projection_pipeline_orders_components_by_variance() {
    let view = ReduceHandler::new()
        .handle(ReduceCommand {
            entities: program_roster(),
            feature_names: Some(feature_names()),
            components: Some(3),
        })
        .unwrap();

    assert_eq!(view.entities.len(), 8);
    assert_eq!(view.explained_variance_ratio.len(), 3);
    for pair in view.explained_variance_ratio.windows(2) {
        assert!(pair[0] >= pair[1] - 1e-12);
    }
    assert!(view.cumulative_variance[2] <= 1.0 + 1e-12);
    assert!(view.axis_labels[0].contains("variance"));
}

#[test]
fn projection_rejects_a_single_entity() {
    let err = ReduceHandler::new()
        .handle(ReduceCommand {
            entities: program_roster().into_iter().take(1).collect(),
            feature_names: None,
            components: None,
        })
        .unwrap_err();

    assert!(err.is_client_error());
}

// =============================================================================
// Clustering
// =============================================================================

#[test]
fn clustering_pipeline_separates_heritage_from_sports() {
    // The roster is built from two indicator profiles, so k=2 should split
    // it cleanly along group lines.
    let handler = ClusterHandler::new(fast_engine_config());
    let view = handler
        .handle(ClusterCommand {
            entities: program_roster(),
            feature_names: None,
            cluster_count: 2,
            use_projection: true,
            seed: Some(13),
        })
        .unwrap();

    assert!(view.projected);
    assert_eq!(view.centroids.len(), 2);
    assert_eq!(view.boundaries.len(), 2);
    assert!(view.silhouette.is_some());
    assert!(view.calinski_harabasz.is_some());

    let heritage: Vec<usize> = view
        .assignments
        .iter()
        .filter(|a| a.name.contains("opera") || a.name.contains("puppetry"))
        .map(|a| a.cluster_id)
        .collect();
    assert_eq!(heritage[0], heritage[1]);
}

#[test]
fn clustering_rejects_more_clusters_than_entities() {
    let handler = ClusterHandler::new(fast_engine_config());
    let err = handler
        .handle(ClusterCommand {
            entities: program_roster().into_iter().take(3).collect(),
            feature_names: None,
            cluster_count: 5,
            use_projection: true,
            seed: Some(1),
        })
        .unwrap_err();

    assert!(err.is_client_error());
    assert_eq!(err.code(), "DIMENSION_MISMATCH");
}

// =============================================================================
// Simulation
// =============================================================================

#[test]
fn simulation_pipeline_traces_weighted_fitness() {
    let handler = SimulateHandler::new(fast_engine_config());
    let view = handler
        .handle(SimulateCommand {
            entities: program_roster(),
            pairwise_matrix: None,
            iterations: Some(50),
            seed: Some(99),
        })
        .unwrap();

    assert_eq!(view.iterations, 50);
    assert_eq!(view.trajectory.len(), 50);
    assert!(view.trajectory.iter().all(|row| row.len() == 8));
    assert!((view.weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);

    // Iteration 0 is the unperturbed equal-weight score.
    let expected: f64 = [95.0, 42.0, 38.0, 30.0, 12.0].iter().sum::<f64>() / 5.0;
    assert!((view.trajectory[0][0] - expected).abs() < 1e-9);
}

#[test]
fn simulation_honors_pairwise_judgments() {
    let handler = SimulateHandler::new(fast_engine_config());
    let roster: Vec<Entity> = program_roster()
        .into_iter()
        .map(|e| Entity::new(e.name, e.group, e.indicators[..2].to_vec()))
        .collect();

    let view = handler
        .handle(SimulateCommand {
            entities: roster,
            pairwise_matrix: Some(vec![vec![1.0, 4.0], vec![0.25, 1.0]]),
            iterations: Some(10),
            seed: Some(4),
        })
        .unwrap();

    assert!((view.weights[0] - 0.8).abs() < 1e-6);
    assert!((view.weights[1] - 0.2).abs() < 1e-6);
}

// =============================================================================
// Determinism across the engine
// =============================================================================

#[test]
fn seeded_runs_are_fully_reproducible() {
    let train = TrainScoreHandler::new(Arc::new(AdamTrainer), fast_engine_config());
    let cmd = TrainScoreCommand {
        entities: program_roster(),
        feature_names: None,
        seed: Some(31),
    };
    let a = train.handle(cmd.clone()).unwrap();
    let b = train.handle(cmd).unwrap();
    assert_eq!(a.losses, b.losses);
    for (x, y) in a.scores.iter().zip(b.scores.iter()) {
        assert_eq!(x.prediction, y.prediction);
        assert_eq!(x.target, y.target);
    }

    let simulate = SimulateHandler::new(fast_engine_config());
    let cmd = SimulateCommand {
        entities: program_roster(),
        pairwise_matrix: None,
        iterations: Some(25),
        seed: Some(31),
    };
    let a = simulate.handle(cmd.clone()).unwrap();
    let b = simulate.handle(cmd).unwrap();
    assert_eq!(a.trajectory, b.trajectory);
}
