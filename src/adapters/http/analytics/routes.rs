//! Axum router configuration for the analytics endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    clustering, explain, health, pca_analysis, simulation, train, AnalyticsHandlers,
};

/// Create the analytics API router.
///
/// Suitable for mounting at `/api`.
///
/// # Routes
/// - `POST /neural-network/train` - Train a scoring model over a roster
/// - `POST /shap/explain` - Per-entity feature attribution
/// - `POST /pca/analysis` - Principal-component projection
/// - `POST /clustering/advanced` - K-means clustering with boundaries
/// - `POST /simulation/fitness` - Fitness drift simulation
/// - `GET /health` - Liveness probe
pub fn analytics_router(handlers: AnalyticsHandlers) -> Router {
    Router::new()
        .route("/neural-network/train", post(train))
        .route("/shap/explain", post(explain))
        .route("/pca/analysis", post(pca_analysis))
        .route("/clustering/advanced", post(clustering))
        .route("/simulation/fitness", post(simulation))
        .route("/health", get(health))
        .with_state(handlers)
}
