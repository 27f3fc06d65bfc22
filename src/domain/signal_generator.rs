//! Row-wise signal generation from indicator crossings.
//!
//! BUY when any of:
//! - close crosses below the lower Bollinger band
//! - fast EMA crosses above slow EMA
//! - MACD line crosses above its signal line
//! - RSI drops to/through `oversold` from at least `oversold + margin`
//!
//! SELL on the mirrored conditions. BUY wins when both sets match on the same
//! row. Row 0 and rows with undefined indicator values never cross.

use crate::domain::error::SigtraderError;
use crate::domain::frame::{IndicatorFrame, IndicatorRow};
use crate::domain::indicator_config::{IndicatorConfig, RsiConfig};
use crate::domain::signal::{SignalFrame, TradeSignal};

#[derive(Debug, Clone)]
pub struct SignalGenerator {
    config: IndicatorConfig,
}

impl SignalGenerator {
    pub fn new(config: IndicatorConfig) -> Result<Self, SigtraderError> {
        config.validate()?;
        Ok(SignalGenerator { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// One signal per row, same order; row `i` only looks at rows `i` and `i-1`.
    pub fn generate(&self, frame: &IndicatorFrame) -> Vec<TradeSignal> {
        let rows = frame.rows();
        (0..rows.len())
            .map(|i| {
                if i == 0 {
                    TradeSignal::Hold
                } else {
                    self.classify(&rows[i - 1], &rows[i])
                }
            })
            .collect()
    }

    /// Generate signals and attach them to the frame's price columns.
    pub fn signal_frame(&self, frame: &IndicatorFrame) -> Result<SignalFrame, SigtraderError> {
        let signals = self.generate(frame);
        let frame = SignalFrame::from_indicators(frame, signals)?;
        tracing::info!(
            rows = frame.len(),
            buys = frame.count(TradeSignal::Buy),
            sells = frame.count(TradeSignal::Sell),
            "generated trade signals"
        );
        Ok(frame)
    }

    fn classify(&self, prev: &IndicatorRow, curr: &IndicatorRow) -> TradeSignal {
        if is_buy(prev, curr, &self.config.rsi) {
            TradeSignal::Buy
        } else if is_sell(prev, curr, &self.config.rsi) {
            TradeSignal::Sell
        } else {
            TradeSignal::Hold
        }
    }
}

fn is_buy(prev: &IndicatorRow, curr: &IndicatorRow, rsi: &RsiConfig) -> bool {
    let lower_band_break = crosses_below(
        pair(Some(curr.candle.close), curr.bollinger.map(|b| b.lower)),
        pair(Some(prev.candle.close), prev.bollinger.map(|b| b.lower)),
    );
    let golden_cross = crosses_above(
        pair(curr.ema_fast, curr.ema_slow),
        pair(prev.ema_fast, prev.ema_slow),
    );
    let macd_bullish = crosses_above(
        curr.macd.map(|m| (m.line, m.signal)),
        prev.macd.map(|m| (m.line, m.signal)),
    );
    let rsi_oversold = match (curr.rsi, prev.rsi) {
        (Some(now), Some(before)) => now <= rsi.oversold && before >= rsi.oversold + rsi.margin,
        _ => false,
    };

    lower_band_break || golden_cross || macd_bullish || rsi_oversold
}

fn is_sell(prev: &IndicatorRow, curr: &IndicatorRow, rsi: &RsiConfig) -> bool {
    let upper_band_break = crosses_above(
        pair(Some(curr.candle.close), curr.bollinger.map(|b| b.upper)),
        pair(Some(prev.candle.close), prev.bollinger.map(|b| b.upper)),
    );
    let death_cross = crosses_below(
        pair(curr.ema_fast, curr.ema_slow),
        pair(prev.ema_fast, prev.ema_slow),
    );
    let macd_bearish = crosses_below(
        curr.macd.map(|m| (m.line, m.signal)),
        prev.macd.map(|m| (m.line, m.signal)),
    );
    let rsi_overbought = match (curr.rsi, prev.rsi) {
        (Some(now), Some(before)) => {
            now >= rsi.overbought && before <= rsi.overbought - rsi.margin
        }
        _ => false,
    };

    upper_band_break || death_cross || macd_bearish || rsi_overbought
}

fn pair(left: Option<f64>, right: Option<f64>) -> Option<(f64, f64)> {
    Some((left?, right?))
}

/// `left` moved from at-or-below `right` to strictly above it.
fn crosses_above(curr: Option<(f64, f64)>, prev: Option<(f64, f64)>) -> bool {
    match (curr, prev) {
        (Some((l, r)), Some((pl, pr))) => l > r && pl <= pr,
        _ => false,
    }
}

/// `left` moved from at-or-above `right` to strictly below it.
fn crosses_below(curr: Option<(f64, f64)>, prev: Option<(f64, f64)>) -> bool {
    match (curr, prev) {
        (Some((l, r)), Some((pl, pr))) => l < r && pl >= pr,
        _ => false,
    }
}
