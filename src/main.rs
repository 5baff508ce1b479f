//! Service entrypoint: configuration, tracing, and the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ip_analytics::adapters::http::{analytics_router, AnalyticsHandlers};
use ip_analytics::application::handlers::{
    ClusterHandler, ExplainHandler, ReduceHandler, SimulateHandler, TrainScoreHandler,
};
use ip_analytics::config::AppConfig;
use ip_analytics::domain::neural::AdamTrainer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    let app = build_router(&config);
    let addr = config.server.socket_addr();

    tracing::info!(%addr, environment = ?config.server.environment, "starting ip-analytics");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(config: &AppConfig) -> Router {
    let trainer = Arc::new(AdamTrainer);

    let handlers = AnalyticsHandlers::new(
        Arc::new(TrainScoreHandler::new(
            trainer.clone(),
            config.engine.clone(),
        )),
        Arc::new(ExplainHandler::new(trainer, config.engine.clone())),
        Arc::new(ReduceHandler::new()),
        Arc::new(ClusterHandler::new(config.engine.clone())),
        Arc::new(SimulateHandler::new(config.engine.clone())),
    );

    Router::new()
        .nest("/api", analytics_router(handlers))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    }
}
