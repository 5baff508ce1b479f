//! IP Analytics - Evaluation and ranking of cultural and sports IP programs
//!
//! This crate implements a stateless analytics engine over rosters of named
//! IP entities carrying numeric indicator vectors: pairwise-comparison
//! weighting, stochastic fitness simulation, principal-component projection,
//! clustering with boundary extraction, and neural scoring with
//! feature attribution. An HTTP adapter exposes each procedure as an endpoint.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
