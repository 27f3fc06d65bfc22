//! Long-only single-unit position tracking and round-trip reconstruction.

use crate::domain::signal::{SignalFrame, TradeSignal};

/// A price observed at a row, identified by the row index and its timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub index: usize,
    pub timestamp: i64,
    pub price: f64,
}

/// Scan state: at most one open position at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    entry: Option<Fill>,
}

impl Position {
    pub fn flat() -> Self {
        Position { entry: None }
    }

    pub fn is_open(&self) -> bool {
        self.entry.is_some()
    }

    pub fn entry(&self) -> Option<Fill> {
        self.entry
    }

    /// Open at `fill` when flat. Returns false (and changes nothing) when a
    /// position is already open.
    pub fn open(&mut self, fill: Fill) -> bool {
        if self.entry.is_some() {
            return false;
        }
        self.entry = Some(fill);
        true
    }

    /// Close at `fill`, yielding the completed round trip when one was open.
    pub fn close(&mut self, fill: Fill) -> Option<RoundTrip> {
        self.entry.take().map(|entry| RoundTrip { entry, exit: fill })
    }
}

/// A BUY followed by the next SELL while the position was open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTrip {
    pub entry: Fill,
    pub exit: Fill,
}

impl RoundTrip {
    /// (exit - entry) / entry
    pub fn return_pct(&self) -> f64 {
        (self.exit.price - self.entry.price) / self.entry.price
    }

    pub fn is_profitable(&self) -> bool {
        self.return_pct() > 0.0
    }
}

/// Walk the signal column in order and pair every BUY taken while flat with
/// the next SELL. BUYs while open and SELLs while flat are ignored, as is a
/// trailing open position.
pub fn round_trips(frame: &SignalFrame) -> Vec<RoundTrip> {
    let mut position = Position::flat();
    let mut trips = Vec::new();

    for (index, &signal) in frame.signals().iter().enumerate() {
        let fill = || Fill {
            index,
            timestamp: frame.timestamps()[index],
            price: frame.closes()[index],
        };
        match signal {
            TradeSignal::Buy => {
                position.open(fill());
            }
            TradeSignal::Sell => {
                if let Some(trip) = position.close(fill()) {
                    trips.push(trip);
                }
            }
            TradeSignal::Hold => {}
        }
    }

    trips
}
