//! OHLCV candle representation.

use crate::domain::interval::Interval;
use chrono::DateTime;

/// One OHLCV sample for a fixed interval, keyed by its opening timestamp in
/// milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Render a millisecond timestamp for humans; falls back to the raw number when
/// it is out of chrono's range.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

/// A stretch with missing candles: `from` and `to` are the timestamps of the
/// candles on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub from: i64,
    pub to: i64,
    pub missing: i64,
}

/// Spacing larger than one interval between consecutive candles. Calendar
/// intervals (`1M`) have no fixed spacing and never report gaps.
pub fn find_gaps(candles: &[Candle], interval: Interval) -> Vec<Gap> {
    let Some(step) = interval.duration_ms() else {
        return Vec::new();
    };
    let step = i128::from(step);
    candles
        .windows(2)
        .filter_map(|w| {
            // timestamps may span the full i64 range
            let delta = i128::from(w[1].timestamp) - i128::from(w[0].timestamp);
            if delta <= step {
                return None;
            }
            Some(Gap {
                from: w[0].timestamp,
                to: w[1].timestamp,
                missing: i64::try_from(delta / step - 1).ok()?,
            })
        })
        .collect()
}
