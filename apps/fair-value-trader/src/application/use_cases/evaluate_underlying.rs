//! Evaluate Underlying Use Case
//!
//! One evaluation cycle for a single underlying:
//! 1. Load open symbols (positions and pending limit orders)
//! 2. Estimate realized volatility from daily closes
//! 3. Fetch the underlying's last trade
//! 4. Fetch and screen the option chain
//! 5. Fetch last trades for the screened contracts
//! 6. Value contracts in parallel
//! 7. Decide and execute per contract
//!
//! Steps 1-5 abort the cycle on failure. From step 6 on, failures are
//! recorded per contract and the batch continues.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use thiserror::Error;

use crate::application::ports::{
    BrokerError, ContractSource, MarketDataError, OrderAck, OrderRequest, OrderSink,
    PositionSource, PriceHistorySource, QuoteSource,
};
use crate::application::services::{ContractScreen, ExecutionRetrier, RetryOutcome};
use crate::config::Config;
use crate::domain::option_pricing::{
    BlackScholes, FairValue, FairValueEngine, OptionContract, PricingError, VolatilityEstimator,
};
use crate::domain::shared::Symbol;
use crate::domain::trade_decision::{Action, Decision, DecisionPolicy, OrderSide};
use crate::observability::{
    record_cycle, record_decision, record_order_submission, record_pricing_failure,
};

// ============================================================================
// Settings
// ============================================================================

/// Validated inputs for the cycle.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    /// Risk-free rate used for fair values.
    pub risk_free_rate: f64,
    /// Calendar days of closes used for volatility.
    pub lookback_days: u32,
    /// Contracts per option order.
    pub contract_quantity: Decimal,
    /// Underlying shares bought by the sell fallback.
    pub cover_quantity: Decimal,
    /// Log decisions without submitting orders.
    pub dry_run: bool,
    /// Volatility estimator.
    pub estimator: VolatilityEstimator,
    /// Valuation engine.
    pub engine: FairValueEngine,
    /// Decision policy.
    pub policy: DecisionPolicy,
    /// Chain screen.
    pub screen: ContractScreen,
    /// Sell retrier.
    pub retrier: ExecutionRetrier,
}

impl CycleSettings {
    /// Build settings from configuration.
    ///
    /// # Errors
    ///
    /// Returns `CycleError::InvalidSettings` if a value is rejected by the
    /// domain (tolerance, trading days).
    pub fn from_config(config: &Config) -> Result<Self, CycleError> {
        let pricing = &config.pricing;
        let trading = &config.trading;
        let execution = &config.execution;

        let estimator = VolatilityEstimator::new(pricing.trading_days_per_year)
            .map_err(|e| CycleError::InvalidSettings(e.to_string()))?;
        let policy = DecisionPolicy::new(trading.price_tolerance)
            .map_err(|e| CycleError::InvalidSettings(e.to_string()))?;
        let engine = FairValueEngine::new(BlackScholes::new(pricing.rate_solver))
            .with_trading_days(pricing.trading_days_per_year)
            .map_err(|e| CycleError::InvalidSettings(e.to_string()))?;

        Ok(Self {
            risk_free_rate: pricing.risk_free_rate,
            lookback_days: pricing.volatility_lookback_days,
            contract_quantity: Decimal::from(trading.contract_quantity),
            cover_quantity: Decimal::from(trading.cover_quantity),
            dry_run: trading.dry_run,
            estimator,
            engine,
            policy,
            screen: ContractScreen::new(trading.strike_band.lower, trading.strike_band.upper),
            retrier: ExecutionRetrier::new(
                execution.sell_attempts,
                execution.retry_delay(),
                execution.fallback_trigger,
            ),
        })
    }
}

// ============================================================================
// Report
// ============================================================================

/// What happened to the order side of a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// HOLD needs no order.
    NotRequired,
    /// Dry run, nothing submitted.
    DryRun,
    /// Fair value rounds to a non-positive limit price.
    Skipped {
        /// Why no order was sent.
        reason: String,
    },
    /// BUY limit order accepted.
    Submitted(OrderAck),
    /// BUY limit order failed (no retry).
    Failed(BrokerError),
    /// SELL routed through the retrier.
    Retried(RetryOutcome),
}

/// Per-contract outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    /// Priced, decided and (possibly) executed.
    Decided {
        /// Policy output.
        decision: Decision,
        /// Order handling.
        execution: ExecutionResult,
    },
    /// Pricing failed; the contract was skipped.
    PricingFailed {
        /// Last traded price of the contract.
        market_price: f64,
        /// Why pricing failed.
        error: PricingError,
    },
}

/// Evaluation of one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractEvaluation {
    /// Contract symbol.
    pub contract: Symbol,
    /// Rate implied by the market price, when the solver converges.
    pub implied_rate: Option<f64>,
    /// Result.
    pub outcome: EvaluationOutcome,
}

/// Summary of a cycle for one underlying.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Underlying.
    pub symbol: Symbol,
    /// Valuation date.
    pub as_of: NaiveDate,
    /// Last trade of the underlying.
    pub underlying_price: f64,
    /// Annualized realized volatility.
    pub volatility: f64,
    /// Contracts left after screening.
    pub contracts_screened: usize,
    /// Screened contracts with no last trade.
    pub contracts_without_trade: Vec<Symbol>,
    /// Per-contract results, in chain order.
    pub evaluations: Vec<ContractEvaluation>,
}

impl CycleReport {
    /// Decisions made this cycle.
    pub fn decisions(&self) -> impl Iterator<Item = &Decision> {
        self.evaluations.iter().filter_map(|e| match &e.outcome {
            EvaluationOutcome::Decided { decision, .. } => Some(decision),
            EvaluationOutcome::PricingFailed { .. } => None,
        })
    }

    /// Number of decisions with the given action.
    #[must_use]
    pub fn count(&self, action: Action) -> usize {
        self.decisions().filter(|d| d.action == action).count()
    }

    /// Contracts whose pricing failed.
    #[must_use]
    pub fn pricing_failures(&self) -> usize {
        self.evaluations
            .iter()
            .filter(|e| matches!(e.outcome, EvaluationOutcome::PricingFailed { .. }))
            .count()
    }
}

/// Errors that abort the cycle for an underlying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CycleError {
    /// Open positions or orders could not be loaded.
    #[error("Failed to load open positions: {0}")]
    Positions(#[from] BrokerError),

    /// Market data request failed.
    #[error("Market data unavailable: {0}")]
    MarketData(#[from] MarketDataError),

    /// Volatility could not be estimated.
    #[error("Volatility estimate failed: {0}")]
    Volatility(PricingError),

    /// Latest underlying trade is not a usable spot price.
    #[error("Invalid underlying price: {0}")]
    UnderlyingPrice(PricingError),

    /// Settings rejected by the domain.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl CycleError {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Positions(_) => "positions",
            Self::MarketData(_) => "market_data",
            Self::Volatility(_) => "volatility",
            Self::UnderlyingPrice(_) => "underlying_price",
            Self::InvalidSettings(_) => "settings",
        }
    }
}

// ============================================================================
// Use Case
// ============================================================================

/// Runs the evaluation cycle against a broker and a market data source.
pub struct EvaluateUnderlyingUseCase<B, M>
where
    B: OrderSink + PositionSource,
    M: PriceHistorySource + QuoteSource + ContractSource,
{
    broker: Arc<B>,
    market: Arc<M>,
    settings: CycleSettings,
}

impl<B, M> EvaluateUnderlyingUseCase<B, M>
where
    B: OrderSink + PositionSource,
    M: PriceHistorySource + QuoteSource + ContractSource,
{
    /// Create a new `EvaluateUnderlyingUseCase`.
    pub const fn new(broker: Arc<B>, market: Arc<M>, settings: CycleSettings) -> Self {
        Self {
            broker,
            market,
            settings,
        }
    }

    /// Settings in use.
    pub const fn settings(&self) -> &CycleSettings {
        &self.settings
    }

    /// Run one cycle for `symbol` as of `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `CycleError` when the open positions, price history, volatility,
    /// underlying price, option chain or contract trades cannot be obtained.
    pub async fn execute(&self, symbol: &Symbol, as_of: NaiveDate) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        let result = self.run_cycle(symbol, as_of).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(report) => {
                record_cycle(symbol.as_str(), "ok", elapsed);
                tracing::info!(
                    symbol = %symbol,
                    screened = report.contracts_screened,
                    buys = report.count(Action::Buy),
                    sells = report.count(Action::Sell),
                    holds = report.count(Action::Hold),
                    pricing_failures = report.pricing_failures(),
                    elapsed_ms = duration_ms(elapsed),
                    "Cycle complete"
                );
            }
            Err(e) => {
                record_cycle(symbol.as_str(), e.kind(), elapsed);
                tracing::error!(symbol = %symbol, error = %e, "Cycle aborted");
            }
        }

        result
    }

    async fn run_cycle(&self, symbol: &Symbol, as_of: NaiveDate) -> Result<CycleReport, CycleError> {
        // 1. Open symbols
        let open_symbols = self.broker.open_symbols().await?;

        // 2. Volatility
        let start = as_of
            .checked_sub_days(Days::new(u64::from(self.settings.lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        let closes = self.market.daily_closes(symbol, start).await?;
        let volatility = self
            .settings
            .estimator
            .annualized_volatility(&closes)
            .map_err(CycleError::Volatility)?;
        if volatility <= 0.0 {
            return Err(CycleError::Volatility(PricingError::domain(format!(
                "realized volatility of {symbol} is zero over {} closes",
                closes.len()
            ))));
        }

        // 3. Underlying price
        let underlying_price = self.market.latest_trade(symbol).await?;
        if !(underlying_price.is_finite() && underlying_price > 0.0) {
            return Err(CycleError::UnderlyingPrice(PricingError::domain(format!(
                "last trade of {symbol} must be finite and positive, got {underlying_price}"
            ))));
        }
        tracing::info!(
            symbol = %symbol,
            volatility,
            underlying_price,
            closes = closes.len(),
            "Underlying inputs ready"
        );

        // 4. Chain
        let chain = self.market.option_contracts(symbol).await?;
        let chain_size = chain.len();
        let screened = self
            .settings
            .screen
            .screen(chain, &open_symbols, underlying_price, as_of);
        tracing::debug!(
            symbol = %symbol,
            chain_size,
            screened = screened.len(),
            open = open_symbols.len(),
            "Screened option chain"
        );

        // 5. Contract trades
        let contract_symbols: Vec<Symbol> = screened.iter().map(|c| c.symbol().clone()).collect();
        let trades = self.market.latest_option_trades(&contract_symbols).await?;

        let mut contracts_without_trade = Vec::new();
        let mut quoted = Vec::with_capacity(screened.len());
        for contract in &screened {
            match trades.get(contract.symbol()) {
                Some(&price) => quoted.push((contract, price)),
                None => {
                    tracing::warn!(contract = %contract.symbol(), "No trade for contract, skipping");
                    contracts_without_trade.push(contract.symbol().clone());
                }
            }
        }

        // 6. Fair values
        let priced = self.price_all(&quoted, underlying_price, volatility, as_of);

        // 7. Decide and execute
        let mut evaluations = Vec::with_capacity(priced.len());
        for (contract, market_price, fair_value, implied_rate) in priced {
            let outcome = match fair_value {
                Ok(fair_value) => self.decide_and_execute(contract, fair_value, market_price).await,
                Err(error) => {
                    record_pricing_failure(error.kind());
                    tracing::warn!(
                        contract = %contract.symbol(),
                        market_price,
                        error = %error,
                        "Pricing failed, contract skipped"
                    );
                    EvaluationOutcome::PricingFailed {
                        market_price,
                        error,
                    }
                }
            };
            evaluations.push(ContractEvaluation {
                contract: contract.symbol().clone(),
                implied_rate,
                outcome,
            });
        }

        Ok(CycleReport {
            symbol: symbol.clone(),
            as_of,
            underlying_price,
            volatility,
            contracts_screened: screened.len(),
            contracts_without_trade,
            evaluations,
        })
    }

    /// Value every quoted contract on the rayon pool.
    #[allow(clippy::type_complexity)]
    fn price_all<'a>(
        &self,
        quoted: &[(&'a OptionContract, f64)],
        underlying_price: f64,
        volatility: f64,
        as_of: NaiveDate,
    ) -> Vec<(&'a OptionContract, f64, Result<FairValue, PricingError>, Option<f64>)> {
        let engine = &self.settings.engine;
        let rate = self.settings.risk_free_rate;

        quoted
            .par_iter()
            .map(|&(contract, market_price)| {
                let fair_value =
                    engine.evaluate(contract, underlying_price, volatility, rate, as_of);
                let implied_rate = engine
                    .implied_rate(contract, underlying_price, volatility, market_price, as_of)
                    .ok();
                (contract, market_price, fair_value, implied_rate)
            })
            .collect()
    }

    async fn decide_and_execute(
        &self,
        contract: &OptionContract,
        fair_value: FairValue,
        market_price: f64,
    ) -> EvaluationOutcome {
        let decision = self.settings.policy.decide(contract, fair_value, market_price);
        record_decision(decision.action.as_label());
        tracing::info!(
            contract = %contract.symbol(),
            fair_value = fair_value.value(),
            market_price,
            edge = decision.edge(),
            action = %decision.action,
            "Decision"
        );

        let execution = self.execute_decision(&decision).await;
        EvaluationOutcome::Decided {
            decision,
            execution,
        }
    }

    async fn execute_decision(&self, decision: &Decision) -> ExecutionResult {
        let Some(side) = decision.action.order_side() else {
            return ExecutionResult::NotRequired;
        };
        if self.settings.dry_run {
            tracing::info!(contract = %decision.contract.symbol(), %side, "Dry run, order not submitted");
            return ExecutionResult::DryRun;
        }

        let Some(limit_price) = limit_price(decision.fair_value) else {
            let reason = format!(
                "fair value {} rounds to a non-positive limit price",
                decision.fair_value
            );
            tracing::warn!(contract = %decision.contract.symbol(), %reason, "Order skipped");
            return ExecutionResult::Skipped { reason };
        };

        let contract_symbol = decision.contract.symbol().clone();
        let quantity = self.settings.contract_quantity;

        match side {
            OrderSide::Buy => {
                let request = OrderRequest::limit(contract_symbol, side, quantity, limit_price);
                match self.broker.submit_order(request).await {
                    Ok(ack) => {
                        record_order_submission("buy", "submitted");
                        ExecutionResult::Submitted(ack)
                    }
                    Err(error) => {
                        record_order_submission("buy", error.kind());
                        tracing::error!(
                            contract = %decision.contract.symbol(),
                            %limit_price,
                            error = %error,
                            "Buy order failed"
                        );
                        ExecutionResult::Failed(error)
                    }
                }
            }
            OrderSide::Sell => {
                let broker = self.broker.as_ref();
                let underlying = decision.contract.underlying().clone();
                let cover_quantity = self.settings.cover_quantity;

                let outcome = self
                    .settings
                    .retrier
                    .execute_sell(
                        || {
                            broker.submit_order(OrderRequest::limit(
                                contract_symbol.clone(),
                                OrderSide::Sell,
                                quantity,
                                limit_price,
                            ))
                        },
                        || {
                            tracing::info!(
                                underlying = %underlying,
                                %cover_quantity,
                                "Buying underlying to cover the sell"
                            );
                            broker.submit_order(OrderRequest::market(
                                underlying.clone(),
                                OrderSide::Buy,
                                cover_quantity,
                            ))
                        },
                    )
                    .await;

                let status = if outcome.is_success() { "submitted" } else { "exhausted" };
                record_order_submission("sell", status);
                ExecutionResult::Retried(outcome)
            }
        }
    }
}

/// Fair value rounded to cents, if positive.
fn limit_price(fair_value: FairValue) -> Option<Decimal> {
    Decimal::from_f64(fair_value.value())
        .map(|d| d.round_dp(2))
        .filter(|d| *d > Decimal::ZERO)
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
