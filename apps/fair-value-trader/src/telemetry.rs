//! Tracing Setup
//!
//! Console logging through `tracing-subscriber`.
//!
//! # Configuration
//!
//! - `observability.logging.level`: default filter directive (default: `info`)
//! - `observability.logging.format`: `json` or `pretty` (default: `json`)
//! - `RUST_LOG`: overrides the configured level when set
//!
//! # Usage
//!
//! ```rust,ignore
//! use fair_value_trader::telemetry::init_tracing;
//!
//! init_tracing(&config.observability.logging)?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Tracing initialization errors.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("Invalid log level '{level}': {message}")]
    InvalidLevel {
        /// Configured level.
        level: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber was already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Build the filter: `RUST_LOG` wins over the configured level.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidLevel` if the configured level does not parse.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::InvalidLevel {
        level: config.level.clone(),
        message: e.to_string(),
    })
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns `TelemetryError` if the level is invalid or a subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
    };

    result.map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_parses() {
        let config = LoggingConfig {
            level: "fair_value_trader=debug,info".to_string(),
            format: LogFormat::Pretty,
        };
        // RUST_LOG may be set in the test environment; either way a filter results.
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn garbage_level_is_rejected_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "fair_value_trader=loud".to_string(),
            format: LogFormat::Json,
        };
        assert!(matches!(
            build_filter(&config),
            Err(TelemetryError::InvalidLevel { .. })
        ));
    }
}
