//! Report output port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SigtraderError;
use std::path::Path;

/// Port for writing backtest results.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), SigtraderError>;
}
