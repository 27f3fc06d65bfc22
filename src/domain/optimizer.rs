//! Signal optimizer: prune round trips that would have lost money.
//!
//! A single [`filter_profitable`] pass keeps the BUY and SELL of every round
//! trip with a strictly positive return and demotes every other row to HOLD.
//! [`optimize`] repeats the pass until the column stops changing. Each pass
//! builds its own scan state from scratch.

use crate::domain::abort::AbortHandle;
use crate::domain::error::SigtraderError;
use crate::domain::position::round_trips;
use crate::domain::signal::{SignalFrame, TradeSignal};

pub const MAX_PASSES: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Optimized {
    pub frame: SignalFrame,
    /// Filter passes run, including the final one that confirmed the fixed
    /// point. Zero for an empty frame.
    pub passes: usize,
}

/// One filter pass.
pub fn filter_profitable(frame: &SignalFrame) -> SignalFrame {
    let mut keep = vec![false; frame.len()];
    for trip in round_trips(frame) {
        if trip.is_profitable() {
            keep[trip.entry.index] = true;
            keep[trip.exit.index] = true;
        }
    }

    let signals = frame
        .signals()
        .iter()
        .zip(&keep)
        .map(|(&signal, &kept)| if kept { signal } else { TradeSignal::Hold })
        .collect();
    frame.with_signals(signals)
}

pub fn optimize(frame: &SignalFrame) -> Result<Optimized, SigtraderError> {
    run(frame, None)
}

pub fn optimize_with_abort(
    frame: &SignalFrame,
    abort: &AbortHandle,
) -> Result<Optimized, SigtraderError> {
    run(frame, Some(abort))
}

fn run(frame: &SignalFrame, abort: Option<&AbortHandle>) -> Result<Optimized, SigtraderError> {
    if frame.is_empty() {
        return Ok(Optimized {
            frame: frame.clone(),
            passes: 0,
        });
    }

    let mut current = frame.clone();
    for pass in 1..=MAX_PASSES {
        if abort.is_some_and(AbortHandle::is_aborted) {
            return Err(SigtraderError::Aborted);
        }

        let next = filter_profitable(&current);
        let stable = next.signals() == current.signals();
        tracing::debug!(
            pass,
            buys = next.count(TradeSignal::Buy),
            sells = next.count(TradeSignal::Sell),
            stable,
            "optimizer pass"
        );

        if stable {
            let raw = frame.len() - frame.count(TradeSignal::Hold);
            let kept = next.len() - next.count(TradeSignal::Hold);
            tracing::info!(
                passes = pass,
                kept,
                dropped = raw - kept,
                "signal optimization converged"
            );
            return Ok(Optimized {
                frame: next,
                passes: pass,
            });
        }
        current = next;
    }

    Err(SigtraderError::OptimizerDiverged { passes: MAX_PASSES })
}
