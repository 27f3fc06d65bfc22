//! Strategy account: cash, shares and the trade ledger for one backtest run.

use crate::domain::signal::TradeSignal;

/// One executed trade. Appended to the ledger and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub timestamp: i64,
    pub signal: TradeSignal,
    pub price: f64,
    pub shares: f64,
    /// Cash after the trade settled.
    pub proceeds: f64,
}

/// Account state after a row was processed.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub shares: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyAccount {
    pub initial_capital: f64,
    pub proceeds: f64,
    pub shares: f64,
    pub transaction_cost: f64,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    is_open: bool,
}

impl StrategyAccount {
    pub fn new(initial_capital: f64, transaction_cost: f64) -> Self {
        StrategyAccount {
            initial_capital,
            proceeds: initial_capital,
            shares: 0.0,
            transaction_cost,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            is_open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Commit all cash, net of cost, to a position at `price`. No-op while a
    /// position is already open.
    pub fn open(&mut self, timestamp: i64, price: f64) -> bool {
        if self.is_open {
            return false;
        }
        let deployed = self.proceeds * (1.0 - self.transaction_cost);
        self.shares = deployed / price;
        self.proceeds -= deployed;
        self.is_open = true;
        self.trades.push(TradeRecord {
            timestamp,
            signal: TradeSignal::Buy,
            price,
            shares: self.shares,
            proceeds: self.proceeds,
        });
        true
    }

    /// Liquidate the open position at `price`, net of cost. No-op while flat.
    pub fn close(&mut self, timestamp: i64, price: f64) -> bool {
        if !self.is_open {
            return false;
        }
        let sold = self.shares;
        self.proceeds += sold * price * (1.0 - self.transaction_cost);
        self.shares = 0.0;
        self.is_open = false;
        self.trades.push(TradeRecord {
            timestamp,
            signal: TradeSignal::Sell,
            price,
            shares: sold,
            proceeds: self.proceeds,
        });
        true
    }

    /// Snapshot the account, marking open shares at `price` when it is usable
    /// and at the last snapshot's valuation otherwise.
    pub fn record_equity(&mut self, timestamp: i64, price: f64) {
        let equity = if !self.is_open {
            self.proceeds
        } else if price.is_finite() {
            self.proceeds + self.shares * price
        } else {
            self.equity_curve
                .last()
                .map(|p| p.equity)
                .unwrap_or(self.initial_capital)
        };
        self.equity_curve.push(EquityPoint {
            timestamp,
            shares: self.shares,
            equity,
        });
    }

    /// Overwrite the last snapshot with the flat account's cash. No-op while
    /// a position is open.
    pub fn settle_last_equity(&mut self) {
        if self.is_open {
            return;
        }
        if let Some(last) = self.equity_curve.last_mut() {
            last.shares = 0.0;
            last.equity = self.proceeds;
        }
    }

    /// (proceeds - initial_capital) / initial_capital
    pub fn total_return(&self) -> f64 {
        (self.proceeds - self.initial_capital) / self.initial_capital
    }
}
