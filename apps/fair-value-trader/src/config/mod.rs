//! Configuration module for the trader.
//!
//! YAML configuration with `${VAR}` / `${VAR:-default}` environment
//! interpolation, validated after parsing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fair_value_trader::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//! println!("tolerance: {}", config.trading.price_tolerance);
//! ```

mod brokers;
mod execution;
mod observability;
mod pricing;
mod trading;

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use brokers::{AlpacaConfig, BrokersConfig, HttpRetryConfig};
pub use execution::ExecutionConfig;
pub use observability::{LogFormat, LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use pricing::PricingConfig;
pub use trading::{StrikeBandConfig, TradingConfig};

/// Default configuration path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Broker configuration.
    #[serde(default)]
    pub brokers: BrokersConfig,
    /// Pricing model configuration.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Screening and decision configuration.
    #[serde(default)]
    pub trading: TradingConfig,
    /// Sell retry configuration.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset variables
/// without a default become empty.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let invalid =
        |msg: &str| -> Result<(), ConfigError> { Err(ConfigError::ValidationError(msg.to_string())) };

    // Pricing
    let pricing = &config.pricing;
    if !pricing.risk_free_rate.is_finite() {
        return invalid("pricing.risk_free_rate must be finite");
    }
    if pricing.trading_days_per_year == 0 {
        return invalid("pricing.trading_days_per_year must be positive");
    }
    if pricing.volatility_lookback_days < 2 {
        return invalid("pricing.volatility_lookback_days must be at least 2");
    }
    let solver = &pricing.rate_solver;
    if !solver.seed.is_finite() {
        return invalid("pricing.rate_solver.seed must be finite");
    }
    if !(solver.tolerance.is_finite() && solver.tolerance > 0.0) {
        return invalid("pricing.rate_solver.tolerance must be positive");
    }

    // Trading
    let trading = &config.trading;
    if trading.symbols.is_empty() || trading.symbols.iter().any(|s| s.trim().is_empty()) {
        return invalid("trading.symbols must list at least one non-empty symbol");
    }
    if !(trading.price_tolerance.is_finite() && trading.price_tolerance >= 0.0) {
        return invalid("trading.price_tolerance must be finite and >= 0");
    }
    let band = trading.strike_band;
    if !(band.lower > 0.0 && band.lower <= 1.0 && band.upper >= 1.0 && band.upper.is_finite()) {
        return invalid("trading.strike_band must satisfy 0 < lower <= 1 <= upper");
    }
    if trading.contract_quantity == 0 || trading.cover_quantity == 0 {
        return invalid("trading.contract_quantity and trading.cover_quantity must be positive");
    }

    // Execution
    if config.execution.sell_attempts == 0 {
        return invalid("execution.sell_attempts must be at least 1");
    }

    // Broker HTTP retry
    let retry = &config.brokers.alpaca.retry;
    if retry.max_attempts == 0 {
        return invalid("brokers.alpaca.retry.max_attempts must be at least 1");
    }
    if !(retry.multiplier.is_finite() && retry.multiplier >= 1.0) {
        return invalid("brokers.alpaca.retry.multiplier must be >= 1.0");
    }

    // Observability
    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.listen_addr.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "observability.metrics.listen_addr is not a socket address: {}",
            metrics.listen_addr
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::application::services::FallbackTrigger;
    use crate::infrastructure::broker::alpaca::{AlpacaEnvironment, DataFeed};

    fn expect_invalid(yaml: &str, needle: &str) {
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected validation error containing {needle}");
        };
        assert!(err.to_string().contains(needle), "{err}");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!((config.pricing.risk_free_rate - 0.04302).abs() < f64::EPSILON);
        assert_eq!(config.pricing.trading_days_per_year, 252);
        assert_eq!(config.pricing.volatility_lookback_days, 365);
        assert_eq!(
            config.trading.symbols,
            vec!["AAPL", "NVDA", "KO", "SOFI", "MSFT", "RDDT", "META"]
        );
        assert!((config.trading.price_tolerance - 0.20).abs() < f64::EPSILON);
        assert_eq!(config.trading.cover_quantity, 100);
        assert_eq!(config.execution.sell_attempts, 100);
        assert_eq!(config.execution.fallback_trigger, FallbackTrigger::FirstFailure);
        assert_eq!(config.brokers.alpaca.environment, AlpacaEnvironment::Paper);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_minimal_config() {
        let yaml = r"
trading:
  symbols: [KO]
";
        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config.trading.symbols, vec!["KO"]);
        assert_eq!(config.pricing.rate_solver.max_iterations, 50);
    }

    #[test]
    fn test_load_full_config() {
        let yaml = r"
brokers:
  alpaca:
    api_key: key
    api_secret: secret
    environment: LIVE
    data_feed: sip
    timeout_secs: 10
    trading_base_url: http://localhost:9000
pricing:
  risk_free_rate: -0.001
  rate_solver:
    tolerance: 0.0001
trading:
  price_tolerance: 0.0
  strike_band: { lower: 0.9, upper: 1.2 }
  dry_run: true
execution:
  sell_attempts: 5
  retry_delay_ms: 250
  fallback_trigger: first_rejection
observability:
  logging:
    level: debug
    format: pretty
";
        let config = load_config_from_string(yaml).unwrap();
        let alpaca = &config.brokers.alpaca;
        assert!(alpaca.has_credentials());
        assert_eq!(alpaca.environment, AlpacaEnvironment::Live);
        assert_eq!(alpaca.data_feed, DataFeed::Sip);

        let adapter = alpaca.to_adapter_config();
        assert_eq!(adapter.trading_base_url(), "http://localhost:9000");
        assert_eq!(adapter.data_base_url(), "https://data.alpaca.markets");

        assert!((config.pricing.rate_solver.seed - 0.05).abs() < f64::EPSILON);
        assert!(config.trading.dry_run);
        assert_eq!(config.execution.retry_delay().as_millis(), 250);
        assert_eq!(config.execution.fallback_trigger, FallbackTrigger::FirstRejection);
        assert_eq!(config.observability.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "trading:\n  symbols: [MSFT, META]").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.trading.symbols, vec!["MSFT", "META"]);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = load_config(path.to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = load_config_from_string("trading: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_unknown_environment_is_parse_error() {
        let yaml = "brokers:\n  alpaca:\n    environment: SANDBOX\n";
        assert!(matches!(
            load_config_from_string(yaml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "mode: ${FVT_CONFIG_TEST_NONEXISTENT_VAR:-PAPER}";
        assert_eq!(interpolate_env_vars(input), "mode: PAPER");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "api_key: ${FVT_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "api_key: ");
    }

    #[test]
    fn test_validation_negative_tolerance() {
        expect_invalid("trading:\n  price_tolerance: -0.1\n", "price_tolerance");
    }

    #[test]
    fn test_validation_strike_band() {
        expect_invalid(
            "trading:\n  strike_band: { lower: 1.05, upper: 1.10 }\n",
            "strike_band",
        );
        expect_invalid(
            "trading:\n  strike_band: { lower: 0.95, upper: 0.99 }\n",
            "strike_band",
        );
        expect_invalid(
            "trading:\n  strike_band: { lower: 0.0, upper: 1.1 }\n",
            "strike_band",
        );
    }

    #[test]
    fn test_validation_zero_attempts() {
        expect_invalid("execution:\n  sell_attempts: 0\n", "sell_attempts");
    }

    #[test]
    fn test_validation_zero_trading_days() {
        expect_invalid("pricing:\n  trading_days_per_year: 0\n", "trading_days_per_year");
    }

    #[test]
    fn test_validation_empty_symbols() {
        expect_invalid("trading:\n  symbols: []\n", "symbols");
    }

    #[test]
    fn test_validation_zero_quantity() {
        expect_invalid("trading:\n  cover_quantity: 0\n", "cover_quantity");
    }

    #[test]
    fn test_validation_metrics_address() {
        expect_invalid(
            "observability:\n  metrics:\n    enabled: true\n    listen_addr: nowhere\n",
            "listen_addr",
        );
    }
}
