//! Indicator periods and signal thresholds.
//!
//! Passed explicitly to the indicator calculation and the signal generator so
//! tests can run with arbitrary synthetic thresholds.

use crate::domain::error::SigtraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerConfig {
    pub period: usize,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmaConfig {
    pub fast: usize,
    pub slow: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdConfig {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiConfig {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
    /// Distance the previous RSI must have been away from the threshold for a
    /// move through it to count.
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorConfig {
    pub bollinger: BollingerConfig,
    pub ema: EmaConfig,
    pub macd: MacdConfig,
    pub rsi: RsiConfig,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        BollingerConfig {
            period: 20,
            std_dev: 2.0,
        }
    }
}

impl Default for EmaConfig {
    fn default() -> Self {
        EmaConfig { fast: 9, slow: 21 }
    }
}

impl Default for MacdConfig {
    fn default() -> Self {
        MacdConfig {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl Default for RsiConfig {
    fn default() -> Self {
        RsiConfig {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            margin: 10.0,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), SigtraderError> {
        positive_period("bollinger", "period", self.bollinger.period)?;
        if !self.bollinger.std_dev.is_finite() || self.bollinger.std_dev <= 0.0 {
            return Err(SigtraderError::invalid(
                "bollinger",
                "std_dev",
                "std_dev must be a positive number",
            ));
        }

        positive_period("ema", "fast", self.ema.fast)?;
        positive_period("ema", "slow", self.ema.slow)?;

        positive_period("macd", "fast", self.macd.fast)?;
        positive_period("macd", "slow", self.macd.slow)?;
        positive_period("macd", "signal", self.macd.signal)?;

        positive_period("rsi", "period", self.rsi.period)?;
        percentage("oversold", self.rsi.oversold)?;
        percentage("overbought", self.rsi.overbought)?;
        if self.rsi.oversold >= self.rsi.overbought {
            return Err(SigtraderError::invalid(
                "rsi",
                "oversold",
                "oversold must be below overbought",
            ));
        }
        if !self.rsi.margin.is_finite() || self.rsi.margin < 0.0 {
            return Err(SigtraderError::invalid(
                "rsi",
                "margin",
                "margin must be non-negative",
            ));
        }
        Ok(())
    }

    /// Number of leading rows that carry at least one undefined indicator.
    pub fn warmup(&self) -> usize {
        let bollinger = self.bollinger.period.saturating_sub(1);
        let ema = self.ema.fast.max(self.ema.slow).saturating_sub(1);
        let macd = self.macd.slow.max(self.macd.fast).saturating_sub(1)
            + self.macd.signal.saturating_sub(1);
        let rsi = self.rsi.period;
        bollinger.max(ema).max(macd).max(rsi)
    }
}

fn positive_period(section: &str, key: &str, value: usize) -> Result<(), SigtraderError> {
    if value == 0 {
        return Err(SigtraderError::invalid(
            section,
            key,
            format!("{key} must be at least 1"),
        ));
    }
    Ok(())
}

fn percentage(key: &str, value: f64) -> Result<(), SigtraderError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(SigtraderError::invalid(
            "rsi",
            key,
            format!("{key} must be between 0 and 100"),
        ));
    }
    Ok(())
}
