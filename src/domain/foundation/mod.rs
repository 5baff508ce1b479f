//! Foundation types shared by every analytic component.

mod deadline;
mod errors;

pub use deadline::Deadline;
pub use errors::EngineError;
