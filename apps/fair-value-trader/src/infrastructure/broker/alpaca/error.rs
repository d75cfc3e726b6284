//! Errors raised by the Alpaca transport and their port mappings.

use thiserror::Error;

use crate::application::ports::{BrokerError, MarketDataError};

/// Errors from the Alpaca adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlpacaError {
    /// HTTP request could not be built.
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Non-success response not covered by a more specific variant.
    #[error("Alpaca error {code}: {message}")]
    Api {
        /// Alpaca error code, or the HTTP status when absent.
        code: String,
        /// Message from the response body.
        message: String,
    },

    /// Order was rejected.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Account lacks the cash or shares for the order.
    #[error("Insufficient buying power or quantity: {0}")]
    Insufficient(String),

    /// Credentials missing or refused (401, 403).
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the server asked us to wait.
        retry_after_secs: u64,
    },

    /// Transport failure before a response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("Malformed Alpaca response: {0}")]
    JsonParse(String),

    /// Max retries exceeded.
    #[error("Gave up after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Requests sent, including the first.
        attempts: u32,
    },

    /// Resource not found.
    #[error("Not found: {path}")]
    NotFound {
        /// Request path.
        path: String,
    },

    /// Response parsed but holds unusable values.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<AlpacaError> for BrokerError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Http(msg) | AlpacaError::Network(msg) | AlpacaError::JsonParse(msg) => {
                Self::ConnectionError { message: msg }
            }
            AlpacaError::Api { code, message } => Self::Unknown {
                message: format!("{code}: {message}"),
            },
            AlpacaError::OrderRejected(msg) => Self::OrderRejected { reason: msg },
            AlpacaError::Insufficient(_) => Self::InsufficientFunds,
            AlpacaError::AuthenticationFailed => Self::Unknown {
                message: "Authentication failed".to_string(),
            },
            AlpacaError::RateLimited { .. } => Self::RateLimited,
            AlpacaError::MaxRetriesExceeded { attempts } => Self::ConnectionError {
                message: format!("Max retries exceeded after {attempts} attempts"),
            },
            AlpacaError::NotFound { path } => Self::Unknown {
                message: format!("Not found: {path}"),
            },
            AlpacaError::InvalidResponse(msg) => Self::Unknown { message: msg },
        }
    }
}

impl From<AlpacaError> for MarketDataError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Http(msg)
            | AlpacaError::Network(msg) => Self::ConnectionError { message: msg },
            AlpacaError::MaxRetriesExceeded { attempts } => Self::ConnectionError {
                message: format!("Max retries exceeded after {attempts} attempts"),
            },
            AlpacaError::AuthenticationFailed => Self::AuthenticationFailed,
            AlpacaError::RateLimited { .. } => Self::RateLimited,
            AlpacaError::NotFound { path } => Self::SymbolNotFound { symbol: path },
            AlpacaError::JsonParse(msg) | AlpacaError::InvalidResponse(msg) => {
                Self::ApiError { message: msg }
            }
            AlpacaError::Api { code, message } => Self::ApiError {
                message: format!("{code}: {message}"),
            },
            AlpacaError::OrderRejected(msg) | AlpacaError::Insufficient(msg) => {
                Self::ApiError { message: msg }
            }
        }
    }
}
