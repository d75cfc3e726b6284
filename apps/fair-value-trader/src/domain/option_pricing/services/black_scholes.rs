//! Black-Scholes Call Valuation
//!
//! Closed-form price of a European call and its inversion for the
//! risk-free rate:
//! - Price: C = S·Φ(d1) − K·e^(−rT)·Φ(d2)
//! - Rate inversion: Newton-Raphson on r using the analytic rho
//!
//! Φ is evaluated through the complementary error function so that the
//! deep out-of-the-money tail keeps its precision.

// Black-Scholes uses standard mathematical notation (s, k, t, r, sigma)
// Financial formulas use standard notation where mul_add() obscures meaning
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use std::f64::consts::{PI, SQRT_2};

use serde::{Deserialize, Serialize};

use crate::domain::option_pricing::errors::PricingError;
use crate::domain::option_pricing::value_objects::{CallTerms, FairValue, PricingInputs};

/// Below this rho a Newton step on r is meaningless.
const MIN_RHO: f64 = 1e-12;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the implied-rate solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSolverConfig {
    /// Starting rate for the iteration.
    pub seed: f64,
    /// Convergence tolerance (absolute price error).
    pub tolerance: f64,
    /// Maximum Newton-Raphson steps.
    pub max_iterations: u32,
}

impl Default for RateSolverConfig {
    fn default() -> Self {
        Self {
            seed: 0.05,
            tolerance: 1e-6,
            max_iterations: 50,
        }
    }
}

// ============================================================================
// Normal Distribution
// ============================================================================

/// Standard normal CDF (cumulative distribution function).
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x / SQRT_2)
}

/// Standard normal PDF (probability density function).
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 and d2.
fn d1_d2(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<(f64, f64), PricingError> {
    let sigma_sqrt_t = sigma * t.sqrt();
    if !(sigma_sqrt_t.is_finite() && sigma_sqrt_t > 0.0) {
        return Err(PricingError::domain(format!(
            "sigma·sqrt(T) underflowed (sigma={sigma}, T={t})"
        )));
    }

    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
    if d1.is_nan() {
        return Err(PricingError::domain(format!(
            "d1 is undefined for S={s}, K={k}, T={t}, r={r}, sigma={sigma}"
        )));
    }
    Ok((d1, d1 - sigma_sqrt_t))
}

/// Unclamped call price and d2 at the given rate.
fn call_at(terms: &CallTerms, r: f64) -> Result<(f64, f64), PricingError> {
    let (s, k, t, sigma) = (
        terms.spot(),
        terms.strike(),
        terms.time_to_expiry(),
        terms.volatility(),
    );
    let (d1, d2) = d1_d2(s, k, t, r, sigma)?;
    let call = s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2);

    if !call.is_finite() {
        return Err(PricingError::domain(format!(
            "call price is not finite at r={r}"
        )));
    }
    Ok((call, d2))
}

// ============================================================================
// Model
// ============================================================================

/// Black-Scholes model for European calls.
///
/// Stateless apart from the solver configuration; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct BlackScholes {
    solver: RateSolverConfig,
}

impl BlackScholes {
    /// Create a model with the given solver configuration.
    #[must_use]
    pub const fn new(solver: RateSolverConfig) -> Self {
        Self { solver }
    }

    /// Closed-form call price.
    ///
    /// Rounding can leave deep out-of-the-money prices a hair below zero;
    /// those are clamped to zero.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Domain` when an intermediate quantity is not finite.
    pub fn price(&self, inputs: &PricingInputs) -> Result<FairValue, PricingError> {
        let (call, _) = call_at(&inputs.terms(), inputs.rate())?;
        Ok(FairValue::new(call.max(0.0)))
    }

    /// Sensitivity of the call price to the risk-free rate: K·T·e^(−rT)·Φ(d2).
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Domain` when d2 cannot be computed.
    pub fn rho(&self, inputs: &PricingInputs) -> Result<f64, PricingError> {
        let (k, t, r) = (inputs.strike(), inputs.time_to_expiry(), inputs.rate());
        let (_, d2) = d1_d2(inputs.spot(), k, t, r, inputs.volatility())?;
        Ok(k * t * (-r * t).exp() * norm_cdf(d2))
    }

    /// Sensitivity of the call price to volatility: S·φ(d1)·√T.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Domain` when d1 cannot be computed.
    pub fn vega(&self, inputs: &PricingInputs) -> Result<f64, PricingError> {
        let (s, t) = (inputs.spot(), inputs.time_to_expiry());
        let (d1, _) = d1_d2(s, inputs.strike(), t, inputs.rate(), inputs.volatility())?;
        Ok(s * norm_pdf(d1) * t.sqrt())
    }

    /// Risk-free rate that reproduces an observed call price.
    ///
    /// Newton-Raphson from the configured seed, stopping once the pricing
    /// error drops below the tolerance.
    ///
    /// # Errors
    ///
    /// - `PricingError::Domain` if the observed price is invalid, or an iterate
    ///   leaves the domain (non-finite rate, vanishing rho)
    /// - `PricingError::NonConvergence` if the iteration budget runs out
    pub fn imply_rate(&self, terms: &CallTerms, observed_price: f64) -> Result<f64, PricingError> {
        if !(observed_price.is_finite() && observed_price >= 0.0) {
            return Err(PricingError::domain(format!(
                "observed price must be finite and non-negative, got {observed_price}"
            )));
        }

        let mut r = self.solver.seed;
        for i in 0..self.solver.max_iterations {
            let inputs = terms.at_rate(r)?;
            let (call, d2) = call_at(terms, r)?;
            let error = call - observed_price;

            if error.abs() < self.solver.tolerance {
                return Ok(r);
            }

            let t = inputs.time_to_expiry();
            let rho = inputs.strike() * t * (-r * t).exp() * norm_cdf(d2);
            if !(rho.is_finite() && rho > MIN_RHO) {
                return Err(PricingError::domain(format!(
                    "rho vanished at r={r:.6} after {i} iterations"
                )));
            }

            r -= error / rho;
        }

        terms.at_rate(r)?;
        let (call, _) = call_at(terms, r)?;
        let last_error = (call - observed_price).abs();
        if last_error < self.solver.tolerance {
            return Ok(r);
        }

        Err(PricingError::NonConvergence {
            iterations: self.solver.max_iterations,
            last_error,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
