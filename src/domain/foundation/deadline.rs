//! Compute deadline for long-running analytic loops.
//!
//! Training and clustering can be driven arbitrarily slow by large inputs, so
//! every iterative loop checks a deadline and aborts with a structured error
//! instead of holding a blocking worker indefinitely.

use std::time::{Duration, Instant};

use super::errors::EngineError;

/// A wall-clock budget for one analytic call.
///
/// `Deadline::none()` never expires; tests and small inputs use it freely.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Self {
        Self {
            started: Instant::now(),
            budget: None,
        }
    }

    /// A deadline expiring `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget: Some(budget),
        }
    }

    /// Returns an error if the budget is spent.
    pub fn check(&self) -> Result<(), EngineError> {
        match self.budget {
            Some(budget) if self.started.elapsed() > budget => {
                Err(EngineError::DeadlineExceeded {
                    elapsed_ms: self.started.elapsed().as_millis() as u64,
                })
            }
            _ => Ok(()),
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_expires() {
        let deadline = Deadline::none();
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn zero_budget_expires_immediately() {
        let deadline = Deadline::after(Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(2));
        let err = deadline.check().unwrap_err();
        assert_eq!(err.code(), "DEADLINE_EXCEEDED");
    }

    #[test]
    fn generous_budget_does_not_expire() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert!(deadline.check().is_ok());
    }
}
