//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) candles are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_ema(candles: &[Candle], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Ema(period);
    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let values = ema_over(candles.iter().map(|c| c.close), period)
        .into_iter()
        .zip(candles)
        .map(|(ema, candle)| IndicatorPoint {
            timestamp: candle.timestamp,
            valid: ema.is_some(),
            value: IndicatorValue::Simple(ema.unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Running EMA of `closes`, `None` until `period` values have been seen.
pub(crate) fn ema_over(
    closes: impl IntoIterator<Item = f64>,
    period: usize,
) -> Vec<Option<f64>> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut seed_sum = 0.0;
    let mut current: Option<f64> = None;

    closes
        .into_iter()
        .enumerate()
        .map(|(i, close)| {
            current = match current {
                Some(prev) => Some(close * k + prev * (1.0 - k)),
                None => {
                    seed_sum += close;
                    (i + 1 == period).then_some(seed_sum / period as f64)
                }
            };
            current
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_candles;

    #[test]
    fn ema_warmup() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_ema(&candles, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn ema_period_1_tracks_close() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&candles, 1);

        assert_eq!(series.simple(0), Some(10.0));
        assert_eq!(series.simple(1), Some(20.0));
        assert_eq!(series.simple(2), Some(30.0));
    }

    #[test]
    fn ema_seed_is_sma() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&candles, 3);
        let v = series.simple(2).unwrap();
        assert!((v - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_ema(&candles, 3);

        let k = 2.0 / 4.0;
        let sma = 20.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((series.simple(3).unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((series.simple(4).unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_keeps_timestamps() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&candles, 2);
        let stamps: Vec<i64> = series.values.iter().map(|p| p.timestamp).collect();
        let expected: Vec<i64> = candles.iter().map(|c| c.timestamp).collect();
        assert_eq!(stamps, expected);
    }

    #[test]
    fn ema_over_plain_values() {
        let values = ema_over([2.0, 4.0, 6.0, 8.0], 2);
        assert_eq!(values[0], None);
        assert_eq!(values[1], Some(3.0));
        // k = 2/3
        assert!((values[2].unwrap() - 5.0).abs() < 1e-12);
        assert!((values[3].unwrap() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn ema_empty_and_zero_period() {
        assert!(calculate_ema(&[], 3).values.is_empty());
        let candles = make_candles(&[10.0, 20.0]);
        assert!(calculate_ema(&candles, 0).values.is_empty());
    }
}
