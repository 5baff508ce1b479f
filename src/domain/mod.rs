//! The analytics engine: stateless numerical transformations over rosters
//! of IP entities.
//!
//! Every component allocates what it needs, runs to completion, and returns;
//! nothing is retained across calls, so concurrent requests never contend.

pub mod clustering;
pub mod foundation;
pub mod neural;
pub mod projection;
pub mod roster;
pub mod simulation;
pub mod standardize;
pub mod weights;
