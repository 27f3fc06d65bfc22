//! Backtest engine: replay a signal column against a capital account.
//!
//! Rows are processed in timestamp order. A BUY while flat commits all cash,
//! a SELL while open liquidates, anything else is a no-op. A position still
//! open after the last row is closed at that row's price.

use crate::domain::abort::AbortHandle;
use crate::domain::account::{StrategyAccount, TradeRecord};
use crate::domain::error::SigtraderError;
use crate::domain::signal::{SignalFrame, TradeSignal};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 500.0;
pub const DEFAULT_TRANSACTION_COST: f64 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    initial_capital: f64,
    transaction_cost: f64,
}

impl BacktestConfig {
    /// `initial_capital` must be positive; `transaction_cost` is a fraction in
    /// `[0, 1)` charged on both entry and exit.
    pub fn new(initial_capital: f64, transaction_cost: f64) -> Result<Self, SigtraderError> {
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(SigtraderError::invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
        if !transaction_cost.is_finite() || !(0.0..1.0).contains(&transaction_cost) {
            return Err(SigtraderError::invalid(
                "backtest",
                "transaction_cost",
                "transaction_cost must be in [0, 1)",
            ));
        }
        Ok(BacktestConfig {
            initial_capital,
            transaction_cost,
        })
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn transaction_cost(&self) -> f64 {
        self.transaction_cost
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            transaction_cost: DEFAULT_TRANSACTION_COST,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub account: StrategyAccount,
    /// True when the last trade was the end-of-series close.
    pub forced_close: bool,
}

impl BacktestResult {
    pub fn proceeds(&self) -> f64 {
        self.account.proceeds
    }

    pub fn total_return(&self) -> f64 {
        self.account.total_return()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.account.trades
    }
}

pub fn run_backtest(
    frame: &SignalFrame,
    config: &BacktestConfig,
) -> Result<BacktestResult, SigtraderError> {
    run(frame, config, None)
}

pub fn run_backtest_with_abort(
    frame: &SignalFrame,
    config: &BacktestConfig,
    abort: &AbortHandle,
) -> Result<BacktestResult, SigtraderError> {
    run(frame, config, Some(abort))
}

fn run(
    frame: &SignalFrame,
    config: &BacktestConfig,
    abort: Option<&AbortHandle>,
) -> Result<BacktestResult, SigtraderError> {
    let mut account = StrategyAccount::new(config.initial_capital, config.transaction_cost);
    let timestamps = frame.timestamps();
    let closes = frame.closes();

    for (i, &signal) in frame.signals().iter().enumerate() {
        if abort.is_some_and(AbortHandle::is_aborted) {
            return Err(SigtraderError::Aborted);
        }

        let (timestamp, close) = (timestamps[i], closes[i]);
        let traded = match signal {
            TradeSignal::Buy => account.open(timestamp, close),
            TradeSignal::Sell => account.close(timestamp, close),
            TradeSignal::Hold => false,
        };
        if traded {
            tracing::debug!(timestamp, %signal, price = close, proceeds = account.proceeds, "trade");
        }
        account.record_equity(timestamp, close);
    }

    let mut forced_close = false;
    if account.is_open() {
        let index = frame.len() - 1;
        let (timestamp, close) = (timestamps[index], closes[index]);
        if !close.is_finite() {
            return Err(SigtraderError::MissingClose { index, timestamp });
        }
        if close <= 0.0 {
            return Err(SigtraderError::NonPositiveClose {
                index,
                timestamp,
                close,
            });
        }
        account.close(timestamp, close);
        account.settle_last_equity();
        forced_close = true;
        tracing::debug!(timestamp, price = close, "closed open position at end of series");
    }

    tracing::info!(
        trades = account.trades.len(),
        proceeds = account.proceeds,
        total_return = account.total_return(),
        "backtest complete"
    );

    Ok(BacktestResult {
        account,
        forced_close,
    })
}
