//! HTTP DTOs for the analytics endpoints.
//!
//! Request types decouple the wire format from domain types; response bodies
//! are the application-layer views serialized directly.

use serde::{Deserialize, Serialize};

use crate::domain::roster::Entity;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One IP entity as submitted over the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct IpDto {
    pub name: String,
    #[serde(default)]
    pub group: String,
    pub indicators: Vec<f64>,
}

impl From<IpDto> for Entity {
    fn from(dto: IpDto) -> Self {
        Entity::new(dto.name, dto.group, dto.indicators)
    }
}

/// Request body for POST /api/neural-network/train.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainRequest {
    pub ips: Vec<IpDto>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Request body for POST /api/shap/explain.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplainRequest {
    pub ips: Vec<IpDto>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Request body for POST /api/pca/analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionRequest {
    pub ips: Vec<IpDto>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default)]
    pub n_components: Option<usize>,
}

/// Request body for POST /api/clustering/advanced.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringRequest {
    pub ips: Vec<IpDto>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default = "default_n_clusters")]
    pub n_clusters: usize,
    #[serde(default = "default_use_pca")]
    pub use_pca: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Request body for POST /api/simulation/fitness.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    pub ips: Vec<IpDto>,
    #[serde(default)]
    pub pairwise_matrix: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub iterations: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_n_clusters() -> usize {
    2
}

fn default_use_pca() -> bool {
    true
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Response body for GET /api/health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}
