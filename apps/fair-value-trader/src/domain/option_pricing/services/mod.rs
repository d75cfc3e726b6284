//! Option Pricing Domain Services

mod black_scholes;
mod fair_value_engine;
mod volatility;

pub use black_scholes::{BlackScholes, RateSolverConfig, norm_cdf, norm_pdf};
pub use fair_value_engine::FairValueEngine;
pub use volatility::{VolatilityEstimator, simple_returns};
