//! HTTP handlers for the analytics endpoints.
//!
//! Every compute endpoint moves its command handler onto the blocking pool so
//! training and clustering never stall the async runtime.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::{
    ClusterCommand, ClusterHandler, ExplainCommand, ExplainHandler, ReduceCommand, ReduceHandler,
    SimulateCommand, SimulateHandler, TrainScoreCommand, TrainScoreHandler,
};
use crate::domain::foundation::EngineError;

use super::dto::{
    ClusteringRequest, ErrorResponse, ExplainRequest, HealthResponse, ProjectionRequest,
    SimulationRequest, TrainRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct AnalyticsHandlers {
    train_handler: Arc<TrainScoreHandler>,
    explain_handler: Arc<ExplainHandler>,
    reduce_handler: Arc<ReduceHandler>,
    cluster_handler: Arc<ClusterHandler>,
    simulate_handler: Arc<SimulateHandler>,
}

impl AnalyticsHandlers {
    pub fn new(
        train_handler: Arc<TrainScoreHandler>,
        explain_handler: Arc<ExplainHandler>,
        reduce_handler: Arc<ReduceHandler>,
        cluster_handler: Arc<ClusterHandler>,
        simulate_handler: Arc<SimulateHandler>,
    ) -> Self {
        Self {
            train_handler,
            explain_handler,
            reduce_handler,
            cluster_handler,
            simulate_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/neural-network/train - Train a scoring model over a roster
pub async fn train(
    State(handlers): State<AnalyticsHandlers>,
    Json(req): Json<TrainRequest>,
) -> Response {
    let handler = handlers.train_handler.clone();
    let cmd = TrainScoreCommand {
        entities: req.ips.into_iter().map(Into::into).collect(),
        feature_names: req.feature_names,
        seed: req.seed,
    };

    run_blocking(move || handler.handle(cmd)).await
}

/// POST /api/shap/explain - Per-entity feature attribution
pub async fn explain(
    State(handlers): State<AnalyticsHandlers>,
    Json(req): Json<ExplainRequest>,
) -> Response {
    let handler = handlers.explain_handler.clone();
    let cmd = ExplainCommand {
        entities: req.ips.into_iter().map(Into::into).collect(),
        feature_names: req.feature_names,
        seed: req.seed,
    };

    run_blocking(move || handler.handle(cmd)).await
}

/// POST /api/pca/analysis - Principal-component projection
pub async fn pca_analysis(
    State(handlers): State<AnalyticsHandlers>,
    Json(req): Json<ProjectionRequest>,
) -> Response {
    let handler = handlers.reduce_handler.clone();
    let cmd = ReduceCommand {
        entities: req.ips.into_iter().map(Into::into).collect(),
        feature_names: req.feature_names,
        components: req.n_components,
    };

    run_blocking(move || handler.handle(cmd)).await
}

/// POST /api/clustering/advanced - K-means clustering with boundaries
pub async fn clustering(
    State(handlers): State<AnalyticsHandlers>,
    Json(req): Json<ClusteringRequest>,
) -> Response {
    let handler = handlers.cluster_handler.clone();
    let cmd = ClusterCommand {
        entities: req.ips.into_iter().map(Into::into).collect(),
        feature_names: req.feature_names,
        cluster_count: req.n_clusters,
        use_projection: req.use_pca,
        seed: req.seed,
    };

    run_blocking(move || handler.handle(cmd)).await
}

/// POST /api/simulation/fitness - Fitness drift simulation
pub async fn simulation(
    State(handlers): State<AnalyticsHandlers>,
    Json(req): Json<SimulationRequest>,
) -> Response {
    let handler = handlers.simulate_handler.clone();
    let cmd = SimulateCommand {
        entities: req.ips.into_iter().map(Into::into).collect(),
        pairwise_matrix: req.pairwise_matrix,
        iterations: req.iterations,
        seed: req.seed,
    };

    run_blocking(move || handler.handle(cmd)).await
}

/// GET /api/health - Liveness probe
pub async fn health() -> Response {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: "ip-analytics".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

async fn run_blocking<T, F>(f: F) -> Response
where
    T: serde::Serialize + Send + 'static,
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(view)) => (StatusCode::OK, Json(view)).into_response(),
        Ok(Err(e)) => engine_error_response(e),
        Err(e) => {
            tracing::error!(error = %e, "compute task panicked or was cancelled");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("INTERNAL_ERROR", "compute task failed")),
            )
                .into_response()
        }
    }
}

fn engine_error_response(e: EngineError) -> Response {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if matches!(e, EngineError::DeadlineExceeded { .. }) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        tracing::error!(error = %e, "engine operation failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(ErrorResponse::new(e.code(), e.to_string()))).into_response()
}
