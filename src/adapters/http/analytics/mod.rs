//! HTTP adapter for the analytics endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::AnalyticsHandlers;
pub use routes::analytics_router;
