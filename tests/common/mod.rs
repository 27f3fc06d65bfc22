#![allow(dead_code)]

use sigtrader::domain::candle::Candle;
use sigtrader::domain::error::SigtraderError;
use sigtrader::domain::interval::Interval;
use sigtrader::domain::signal::{SignalFrame, TradeSignal};
use sigtrader::ports::candle_source::CandleSource;
use std::collections::HashMap;

pub const HOUR_MS: i64 = 3_600_000;
/// 2024-01-01 00:00:00 UTC
pub const START_MS: i64 = 1_704_067_200_000;

pub struct MockCandleSource {
    pub data: HashMap<(String, Interval), Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockCandleSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, market: &str, interval: Interval, candles: Vec<Candle>) -> Self {
        self.data.insert((market.to_string(), interval), candles);
        self
    }

    pub fn with_error(mut self, market: &str, reason: &str) -> Self {
        self.errors.insert(market.to_string(), reason.to_string());
        self
    }
}

impl CandleSource for MockCandleSource {
    fn fetch_candles(
        &self,
        market: &str,
        interval: Interval,
    ) -> Result<Vec<Candle>, SigtraderError> {
        if let Some(reason) = self.errors.get(market) {
            return Err(SigtraderError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(&(market.to_string(), interval))
            .cloned()
            .ok_or_else(|| SigtraderError::NoData {
                market: market.to_string(),
                interval: interval.to_string(),
            })
    }
}

pub fn make_candle(timestamp: i64, close: f64) -> Candle {
    Candle {
        timestamp,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1_000.0,
    }
}

/// Hourly candles with the given closes.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_candle(START_MS + i as i64 * HOUR_MS, close))
        .collect()
}

/// An oscillating, slowly rising price series that crosses every indicator
/// threshold several times.
pub fn wave_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + 15.0 * (t / 8.0).sin() + 4.0 * (t / 2.5).cos()
        })
        .collect()
}

/// Signal frame with hourly timestamps.
pub fn signal_frame(closes: &[f64], signals: &[TradeSignal]) -> SignalFrame {
    let timestamps = (0..closes.len() as i64)
        .map(|i| START_MS + i * HOUR_MS)
        .collect();
    SignalFrame::new(timestamps, closes.to_vec(), signals.to_vec()).unwrap()
}

/// Write `candles` in the downloader's CSV layout.
pub fn candle_csv(candles: &[Candle]) -> String {
    let mut out = String::from("Timestamp,Open,High,Low,Close,Volume\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.timestamp, c.open, c.high, c.low, c.close, c.volume
        ));
    }
    out
}
