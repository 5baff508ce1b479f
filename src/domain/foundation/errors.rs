//! Error types for the analytics engine.

use thiserror::Error;

/// Errors produced by analytic computations.
///
/// Validation failures (`InsufficientData`, `Dimension`) are detected before
/// any heavy computation and map to client errors at the HTTP boundary.
/// Everything else maps to a server error. Callers always receive a message,
/// never internal stack detail.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("{operation} requires at least {required} {subject}, got {actual}")]
    InsufficientData {
        operation: &'static str,
        subject: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{0}")]
    Dimension(String),

    #[error("Computation exceeded its deadline after {elapsed_ms} ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Creates an insufficient-data error for an operation's entity floor.
    pub fn too_few_entities(operation: &'static str, required: usize, actual: usize) -> Self {
        EngineError::InsufficientData {
            operation,
            subject: "entities",
            required,
            actual,
        }
    }

    /// Creates an insufficient-data error for an operation's feature floor.
    pub fn too_few_features(operation: &'static str, required: usize, actual: usize) -> Self {
        EngineError::InsufficientData {
            operation,
            subject: "features",
            required,
            actual,
        }
    }

    /// Creates a dimension-mismatch error.
    pub fn dimension(message: impl Into<String>) -> Self {
        EngineError::Dimension(message.into())
    }

    /// Creates an unclassified internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        EngineError::Internal(message.into())
    }

    /// True when the error was caused by caller-supplied data.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientData { .. } | EngineError::Dimension(_)
        )
    }

    /// Stable machine-readable code for the HTTP boundary.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InsufficientData { .. } => "INSUFFICIENT_DATA",
            EngineError::Dimension(_) => "DIMENSION_MISMATCH",
            EngineError::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            EngineError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_entities_displays_operation_and_counts() {
        let err = EngineError::too_few_entities("neural training", 5, 3);
        assert_eq!(
            format!("{}", err),
            "neural training requires at least 5 entities, got 3"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn too_few_features_displays_subject() {
        let err = EngineError::too_few_features("attribution", 2, 1);
        assert_eq!(
            format!("{}", err),
            "attribution requires at least 2 features, got 1"
        );
    }

    #[test]
    fn dimension_error_is_client_error() {
        let err = EngineError::dimension("pairwise matrix must be square");
        assert!(err.is_client_error());
        assert_eq!(err.code(), "DIMENSION_MISMATCH");
    }

    #[test]
    fn internal_error_is_not_client_error() {
        let err = EngineError::internal("unexpected");
        assert!(!err.is_client_error());
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn deadline_error_is_not_client_error() {
        let err = EngineError::DeadlineExceeded { elapsed_ms: 1200 };
        assert!(!err.is_client_error());
        assert_eq!(err.code(), "DEADLINE_EXCEEDED");
    }
}
