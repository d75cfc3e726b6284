//! Option Pricing Errors

use thiserror::Error;

/// Errors raised while valuing a contract or estimating its inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    /// An input violates a numeric precondition of the model.
    #[error("Domain error: {message}")]
    Domain {
        /// What was out of domain.
        message: String,
    },

    /// Too few observations to estimate a statistic.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum number of points.
        required: usize,
        /// Points supplied.
        actual: usize,
    },

    /// Root finding exhausted its iteration budget.
    #[error("No convergence after {iterations} iterations (last error: {last_error:.6})")]
    NonConvergence {
        /// Iterations performed.
        iterations: u32,
        /// Absolute pricing error at the last iterate.
        last_error: f64,
    },
}

impl PricingError {
    /// Build a domain error.
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain {
            message: message.into(),
        }
    }

    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Domain { .. } => "domain",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::NonConvergence { .. } => "non_convergence",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PricingError::domain("volatility must be positive, got 0");
        assert_eq!(
            err.to_string(),
            "Domain error: volatility must be positive, got 0"
        );

        let err = PricingError::InsufficientData {
            required: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data: need at least 2 points, got 1"
        );

        let err = PricingError::NonConvergence {
            iterations: 50,
            last_error: 0.125,
        };
        assert_eq!(
            err.to_string(),
            "No convergence after 50 iterations (last error: 0.125000)"
        );
    }

    #[test]
    fn error_kind_labels() {
        assert_eq!(PricingError::domain("x").kind(), "domain");
        assert_eq!(
            PricingError::InsufficientData {
                required: 2,
                actual: 0
            }
            .kind(),
            "insufficient_data"
        );
    }
}
