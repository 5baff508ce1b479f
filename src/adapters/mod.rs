//! Adapters - outer-edge implementations that expose the engine.

pub mod http;
