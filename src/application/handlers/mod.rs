//! Command handlers wiring rosters through the analytics engine.
//!
//! Handlers are synchronous and stateless: each call validates its input,
//! runs one computation, and returns a serializable view. The HTTP adapter
//! moves them off the async runtime with `spawn_blocking`.

mod cluster;
mod explain;
mod reduce;
mod simulate;
mod train_score;

pub use cluster::{ClusterCommand, ClusterHandler, ClusterView};
pub use explain::{ExplainCommand, ExplainHandler, ExplainView};
pub use reduce::{ReduceCommand, ReduceHandler, ReduceView};
pub use simulate::{SimulateCommand, SimulateHandler, SimulateView};
pub use train_score::{TrainScoreCommand, TrainScoreHandler, TrainScoreView};
