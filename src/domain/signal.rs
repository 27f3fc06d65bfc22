//! Trade signals and the signal frame consumed by the optimizer and the
//! backtest engine.

use std::fmt;

use crate::domain::error::SigtraderError;
use crate::domain::frame::{IndicatorFrame, check_increasing};

/// Per-row trade action. The discriminants are the on-disk class codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TradeSignal {
    #[default]
    Hold = 0,
    Buy = 1,
    Sell = 2,
}

impl TradeSignal {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_hold(self) -> bool {
        self == TradeSignal::Hold
    }
}

impl TryFrom<i64> for TradeSignal {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TradeSignal::Hold),
            1 => Ok(TradeSignal::Buy),
            2 => Ok(TradeSignal::Sell),
            other => Err(other),
        }
    }
}

impl From<TradeSignal> for u8 {
    fn from(signal: TradeSignal) -> Self {
        signal.code()
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeSignal::Hold => "HOLD",
            TradeSignal::Buy => "BUY",
            TradeSignal::Sell => "SELL",
        };
        f.write_str(name)
    }
}

/// Parallel timestamp / close / signal columns.
///
/// Construction guarantees equal lengths, strictly increasing timestamps and a
/// finite positive close on every non-HOLD row.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    timestamps: Vec<i64>,
    closes: Vec<f64>,
    signals: Vec<TradeSignal>,
}

impl SignalFrame {
    pub fn new(
        timestamps: Vec<i64>,
        closes: Vec<f64>,
        signals: Vec<TradeSignal>,
    ) -> Result<Self, SigtraderError> {
        let expected = timestamps.len();
        if closes.len() != expected {
            return Err(SigtraderError::LengthMismatch {
                column: "close".into(),
                expected,
                actual: closes.len(),
            });
        }
        if signals.len() != expected {
            return Err(SigtraderError::LengthMismatch {
                column: "trade_signal".into(),
                expected,
                actual: signals.len(),
            });
        }
        check_increasing(timestamps.iter().copied())?;

        for (index, (&close, signal)) in closes.iter().zip(&signals).enumerate() {
            if signal.is_hold() {
                continue;
            }
            let timestamp = timestamps[index];
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
        }

        Ok(SignalFrame {
            timestamps,
            closes,
            signals,
        })
    }

    /// Build from integer class codes (0 = HOLD, 1 = BUY, 2 = SELL).
    pub fn from_codes(
        timestamps: Vec<i64>,
        closes: Vec<f64>,
        codes: &[i64],
    ) -> Result<Self, SigtraderError> {
        let signals = codes
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                TradeSignal::try_from(value)
                    .map_err(|value| SigtraderError::InvalidSignal { index, value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        SignalFrame::new(timestamps, closes, signals)
    }

    pub fn from_indicators(
        frame: &IndicatorFrame,
        signals: Vec<TradeSignal>,
    ) -> Result<Self, SigtraderError> {
        SignalFrame::new(frame.timestamps(), frame.closes(), signals)
    }

    pub fn empty() -> Self {
        SignalFrame {
            timestamps: Vec::new(),
            closes: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Same price columns with a replacement signal column. Callers only
    /// ever demote signals to HOLD, which keeps the construction invariants.
    pub(crate) fn with_signals(&self, signals: Vec<TradeSignal>) -> Self {
        debug_assert_eq!(signals.len(), self.signals.len());
        SignalFrame {
            timestamps: self.timestamps.clone(),
            closes: self.closes.clone(),
            signals,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn signals(&self) -> &[TradeSignal] {
        &self.signals
    }

    pub fn count(&self, signal: TradeSignal) -> usize {
        self.signals.iter().filter(|&&s| s == signal).count()
    }
}
