//! Indicator frame: candles aligned with their derived indicator values.
//!
//! One row per candle, strictly ordered by timestamp. Indicator fields are
//! `None` until the indicator has enough history.

use crate::domain::candle::Candle;
use crate::domain::error::SigtraderError;
use crate::domain::indicator::{
    IndicatorValue, calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi,
};
use crate::domain::indicator_config::IndicatorConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValues {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub candle: Candle,
    pub bollinger: Option<BollingerBands>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub macd: Option<MacdValues>,
    pub rsi: Option<f64>,
}

impl IndicatorRow {
    /// Row with no indicator values, as seen during warm-up.
    pub fn bare(candle: Candle) -> Self {
        IndicatorRow {
            candle,
            bollinger: None,
            ema_fast: None,
            ema_slow: None,
            macd: None,
            rsi: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    /// Wrap externally computed rows, rejecting out-of-order timestamps.
    pub fn from_rows(rows: Vec<IndicatorRow>) -> Result<Self, SigtraderError> {
        check_increasing(rows.iter().map(|r| r.candle.timestamp))?;
        Ok(IndicatorFrame { rows })
    }

    /// Compute every indicator named in `config` over `candles`.
    pub fn from_candles(
        candles: &[Candle],
        config: &IndicatorConfig,
    ) -> Result<Self, SigtraderError> {
        config.validate()?;
        check_increasing(candles.iter().map(|c| c.timestamp))?;

        let bollinger =
            calculate_bollinger(candles, config.bollinger.period, config.bollinger.std_dev);
        let ema_fast = calculate_ema(candles, config.ema.fast);
        let ema_slow = calculate_ema(candles, config.ema.slow);
        let macd = calculate_macd(candles, config.macd.fast, config.macd.slow, config.macd.signal);
        let rsi = calculate_rsi(candles, config.rsi.period);

        tracing::debug!(
            candles = candles.len(),
            "computed {}, {}, {}, {}, {}",
            bollinger.indicator_type,
            ema_fast.indicator_type,
            ema_slow.indicator_type,
            macd.indicator_type,
            rsi.indicator_type,
        );

        let rows = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| IndicatorRow {
                candle: *candle,
                bollinger: match bollinger.get(i) {
                    Some(IndicatorValue::Bollinger {
                        upper,
                        middle,
                        lower,
                    }) => Some(BollingerBands {
                        upper,
                        middle,
                        lower,
                    }),
                    _ => None,
                },
                ema_fast: ema_fast.simple(i),
                ema_slow: ema_slow.simple(i),
                macd: match macd.get(i) {
                    Some(IndicatorValue::Macd {
                        line,
                        signal,
                        histogram,
                    }) => Some(MacdValues {
                        line,
                        signal,
                        histogram,
                    }),
                    _ => None,
                },
                rsi: rsi.simple(i),
            })
            .collect();

        Ok(IndicatorFrame { rows })
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.rows.iter().map(|r| r.candle.timestamp).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.candle.close).collect()
    }
}

pub(crate) fn check_increasing(
    timestamps: impl IntoIterator<Item = i64>,
) -> Result<(), SigtraderError> {
    let mut previous: Option<i64> = None;
    for (index, current) in timestamps.into_iter().enumerate() {
        if let Some(previous) = previous {
            if current <= previous {
                return Err(SigtraderError::NonMonotonicTimestamp {
                    index,
                    previous,
                    current,
                });
            }
        }
        previous = Some(current);
    }
    Ok(())
}
