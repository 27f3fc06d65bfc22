//! Bollinger Bands indicator.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Warmup: first (period-1) candles are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_bollinger(candles: &[Candle], period: usize, std_dev: f64) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger { period, std_dev };
    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(candles.len());
    let warmup = period - 1;

    for (i, candle) in candles.iter().enumerate() {
        let valid = i >= warmup;

        let (upper, middle, lower) = if valid {
            let window = &candles[i + 1 - period..=i];

            let middle: f64 = window.iter().map(|c| c.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|c| {
                    let diff = c.close - middle;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;

            let band = std_dev * variance.sqrt();
            (middle + band, middle, middle - band)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            timestamp: candle.timestamp,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_candles;

    fn bands(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.get(i) {
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) => (upper, middle, lower),
            other => panic!("expected Bollinger value, got {other:?}"),
        }
    }

    #[test]
    fn bollinger_warmup() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&candles, 3, 2.0);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
    }

    #[test]
    fn bollinger_constant_values_collapse() {
        let candles = make_candles(&[100.0; 5]);
        let series = calculate_bollinger(&candles, 3, 2.0);
        let (upper, middle, lower) = bands(&series, 2);
        assert!((middle - 100.0).abs() < f64::EPSILON);
        assert!((upper - 100.0).abs() < f64::EPSILON);
        assert!((lower - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&candles, 3, 2.0);
        let (upper, middle, lower) = bands(&series, 2);

        let variance: f64 = (100.0 + 0.0 + 100.0) / 3.0;
        let stddev = variance.sqrt();
        assert!((middle - 20.0).abs() < 1e-10);
        assert!((upper - (20.0 + 2.0 * stddev)).abs() < 1e-10);
        assert!((lower - (20.0 - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_fractional_multiplier() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&candles, 3, 1.5);
        let (upper, middle, _) = bands(&series, 2);
        let stddev = (200.0_f64 / 3.0).sqrt();
        assert!((upper - middle - 1.5 * stddev).abs() < 1e-10);
    }

    #[test]
    fn bollinger_zero_period() {
        let candles = make_candles(&[10.0, 20.0]);
        assert!(calculate_bollinger(&candles, 0, 2.0).values.is_empty());
    }
}
