//! Trade ledger export as CSV.

use crate::domain::backtest::BacktestResult;
use crate::domain::candle::format_timestamp;
use crate::domain::error::SigtraderError;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub const LEDGER_HEADER: [&str; 6] = ["Timestamp", "Datetime", "Signal", "Price", "Shares", "Proceeds"];

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }
}

fn csv_error(path: &Path, e: csv::Error) -> SigtraderError {
    SigtraderError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), SigtraderError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;
        writer
            .write_record(LEDGER_HEADER)
            .map_err(|e| csv_error(output_path, e))?;

        for trade in result.trades() {
            writer
                .write_record([
                    trade.timestamp.to_string(),
                    format_timestamp(trade.timestamp),
                    trade.signal.to_string(),
                    trade.price.to_string(),
                    trade.shares.to_string(),
                    trade.proceeds.to_string(),
                ])
                .map_err(|e| csv_error(output_path, e))?;
        }

        writer.flush()?;
        tracing::info!(path = %output_path.display(), trades = result.trades().len(), "trade ledger written");
        Ok(())
    }
}
