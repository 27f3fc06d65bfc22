//! Core domain types and logic.

pub mod abort;
pub mod account;
pub mod backtest;
pub mod candle;
pub mod config_validation;
pub mod error;
pub mod frame;
pub mod indicator;
pub mod indicator_config;
pub mod interval;
pub mod metrics;
pub mod optimizer;
pub mod position;
pub mod signal;
pub mod signal_generator;
