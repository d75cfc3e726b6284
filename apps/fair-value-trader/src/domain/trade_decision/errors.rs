//! Trade Decision Errors

use thiserror::Error;

/// Invalid decision policy configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    /// The tolerance band must be a finite, non-negative width.
    #[error("Invalid price tolerance: {tolerance} (must be finite and >= 0)")]
    InvalidTolerance {
        /// Rejected tolerance.
        tolerance: f64,
    },
}
