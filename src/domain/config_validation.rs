//! Build validated run settings from a [`ConfigPort`].
//!
//! Missing keys fall back to defaults. A key that is present but does not
//! parse is an error, never a silent default.

use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_TRANSACTION_COST};
use crate::domain::error::SigtraderError;
use crate::domain::indicator_config::IndicatorConfig;
use crate::domain::interval::Interval;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_DIR: &str = "data";

/// Where candles come from.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub market: Option<String>,
    pub interval: Interval,
}

impl DataSettings {
    pub fn market(&self) -> Result<&str, SigtraderError> {
        self.market
            .as_deref()
            .ok_or_else(|| SigtraderError::ConfigMissing {
                section: "data".to_string(),
                key: "market".to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub data: DataSettings,
    pub indicators: IndicatorConfig,
    pub backtest: BacktestConfig,
    pub optimize: bool,
}

pub fn load_run_settings(config: &dyn ConfigPort) -> Result<RunSettings, SigtraderError> {
    Ok(RunSettings {
        data: load_data_settings(config)?,
        indicators: load_indicator_config(config)?,
        backtest: load_backtest_config(config)?,
        optimize: parse_bool(config, "backtest", "optimize")?.unwrap_or(true),
    })
}

pub fn load_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, SigtraderError> {
    let dir = non_empty(config, "data", "dir").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let interval = match non_empty(config, "data", "interval") {
        Some(raw) => raw
            .parse::<Interval>()
            .map_err(|e| SigtraderError::invalid("data", "interval", e.to_string()))?,
        None => Interval::OneDay,
    };
    Ok(DataSettings {
        dir: PathBuf::from(dir),
        market: non_empty(config, "data", "market"),
        interval,
    })
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SigtraderError> {
    let capital = parse(config, "backtest", "initial_capital")?.unwrap_or(DEFAULT_INITIAL_CAPITAL);
    let cost = parse(config, "backtest", "transaction_cost")?.unwrap_or(DEFAULT_TRANSACTION_COST);
    BacktestConfig::new(capital, cost)
}

pub fn load_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, SigtraderError> {
    let mut ind = IndicatorConfig::default();

    override_with(config, "bollinger", "period", &mut ind.bollinger.period)?;
    override_with(config, "bollinger", "std_dev", &mut ind.bollinger.std_dev)?;
    override_with(config, "ema", "fast", &mut ind.ema.fast)?;
    override_with(config, "ema", "slow", &mut ind.ema.slow)?;
    override_with(config, "macd", "fast", &mut ind.macd.fast)?;
    override_with(config, "macd", "slow", &mut ind.macd.slow)?;
    override_with(config, "macd", "signal", &mut ind.macd.signal)?;
    override_with(config, "rsi", "period", &mut ind.rsi.period)?;
    override_with(config, "rsi", "oversold", &mut ind.rsi.oversold)?;
    override_with(config, "rsi", "overbought", &mut ind.rsi.overbought)?;
    override_with(config, "rsi", "margin", &mut ind.rsi.margin)?;

    ind.validate()?;
    Ok(ind)
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse<T>(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<T>, SigtraderError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    non_empty(config, section, key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| {
                SigtraderError::invalid(section, key, format!("cannot parse {raw:?}: {e}"))
            })
        })
        .transpose()
}

fn override_with<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    slot: &mut T,
) -> Result<(), SigtraderError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = parse(config, section, key)? {
        *slot = value;
    }
    Ok(())
}

fn parse_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<bool>, SigtraderError> {
    non_empty(config, section, key)
        .map(|raw| match raw.to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(SigtraderError::invalid(
                section,
                key,
                format!("expected a boolean, got {raw:?}"),
            )),
        })
        .transpose()
}
