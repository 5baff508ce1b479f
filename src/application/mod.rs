//! Application layer: one command handler per engine operation.

pub mod handlers;
