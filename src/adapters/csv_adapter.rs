//! CSV candle store: one `{market}-{interval}.csv` file per market and interval.

use crate::domain::candle::Candle;
use crate::domain::error::SigtraderError;
use crate::domain::interval::Interval;
use crate::ports::candle_source::CandleSource;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const CANDLE_HEADER: [&str; 6] = ["Timestamp", "Open", "High", "Low", "Close", "Volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, market: &str, interval: Interval) -> PathBuf {
        self.base_path.join(format!("{}-{}.csv", market, interval))
    }

    /// Markets with a stored file for `interval`, sorted.
    pub fn list_markets(&self, interval: Interval) -> Result<Vec<String>, SigtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SigtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("-{}.csv", interval);
        let mut markets = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SigtraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(market) = name.strip_suffix(&suffix) {
                if !market.is_empty() {
                    markets.push(market.to_string());
                }
            }
        }

        markets.sort();
        Ok(markets)
    }
}

fn field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    column: usize,
    line: u64,
) -> Result<T, SigtraderError>
where
    T::Err: std::fmt::Display,
{
    let name = CANDLE_HEADER[column];
    let raw = record.get(column).ok_or_else(|| SigtraderError::Data {
        reason: format!("line {}: missing {} column", line, name),
    })?;
    raw.trim().parse().map_err(|e| SigtraderError::Data {
        reason: format!("line {}: invalid {} value {:?}: {}", line, name, raw, e),
    })
}

/// Field-for-field identity, NaN included.
fn same_candle(a: &Candle, b: &Candle) -> bool {
    a.timestamp == b.timestamp
        && [
            (a.open, b.open),
            (a.high, b.high),
            (a.low, b.low),
            (a.close, b.close),
            (a.volume, b.volume),
        ]
        .iter()
        .all(|(x, y)| x.to_bits() == y.to_bits())
}

impl CandleSource for CsvAdapter {
    fn fetch_candles(
        &self,
        market: &str,
        interval: Interval,
    ) -> Result<Vec<Candle>, SigtraderError> {
        let path = self.csv_path(market, interval);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SigtraderError::NoData {
                    market: market.to_string(),
                    interval: interval.to_string(),
                });
            }
            Err(e) => return Err(SigtraderError::Io(e)),
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| SigtraderError::Data {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?;
        if headers.iter().map(str::trim).ne(CANDLE_HEADER) {
            return Err(SigtraderError::Data {
                reason: format!(
                    "{}: expected header {}",
                    path.display(),
                    CANDLE_HEADER.join(",")
                ),
            });
        }

        let mut candles = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SigtraderError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            candles.push(Candle {
                timestamp: field(&record, 0, line)?,
                open: field(&record, 1, line)?,
                high: field(&record, 2, line)?,
                low: field(&record, 3, line)?,
                close: field(&record, 4, line)?,
                volume: field(&record, 5, line)?,
            });
        }

        candles.sort_by_key(|c| c.timestamp);

        // Overlapping downloads repeat the boundary candle verbatim.
        let before = candles.len();
        candles.dedup_by(|a, b| same_candle(a, b));
        if candles.len() < before {
            tracing::debug!(market, %interval, dropped = before - candles.len(), "collapsed repeated candles");
        }
        if let Some(pair) = candles.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(SigtraderError::Data {
                reason: format!(
                    "{}: conflicting candles for timestamp {}",
                    path.display(),
                    pair[0].timestamp
                ),
            });
        }

        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "Timestamp,Open,High,Low,Close,Volume\n";

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = format!(
            "{HEADER}\
            1704153600000,105.0,115.0,100.0,110.0,60.5\n\
            1704067200000,100.0,110.0,90.0,105.0,50.25\n\
            1704240000000,110.0,120.0,105.0,115.0,55\n"
        );

        fs::write(path.join("BTC-EUR-1d.csv"), csv_content).unwrap();
        fs::write(path.join("ETH-EUR-1d.csv"), HEADER).unwrap();
        fs::write(path.join("BTC-EUR-1h.csv"), HEADER).unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_candles_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.fetch_candles("BTC-EUR", Interval::OneDay).unwrap();

        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].timestamp, 1704067200000);
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].high, 110.0);
        assert_eq!(candles[0].low, 90.0);
        assert_eq!(candles[0].close, 105.0);
        assert_eq!(candles[0].volume, 50.25);
        assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn missing_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_candles("XRP-EUR", Interval::OneDay);
        assert!(matches!(result, Err(SigtraderError::NoData { .. })));
    }

    #[test]
    fn header_only_file_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch_candles("ETH-EUR", Interval::OneDay).unwrap().is_empty());
    }

    #[test]
    fn repeated_candle_is_collapsed() {
        let dir = TempDir::new().unwrap();
        let row = "1704067200000,1,2,0.5,1.5,10\n";
        fs::write(dir.path().join("BTC-EUR-1d.csv"), format!("{HEADER}{row}{row}")).unwrap();

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert_eq!(adapter.fetch_candles("BTC-EUR", Interval::OneDay).unwrap().len(), 1);
    }

    #[test]
    fn conflicting_duplicate_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BTC-EUR-1d.csv"),
            format!("{HEADER}1704067200000,1,2,0.5,1.5,10\n1704067200000,1,2,0.5,1.6,10\n"),
        )
        .unwrap();

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let result = adapter.fetch_candles("BTC-EUR", Interval::OneDay);
        assert!(matches!(result, Err(SigtraderError::Data { .. })));
    }

    #[test]
    fn bad_number_reports_line() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BTC-EUR-1d.csv"),
            format!("{HEADER}1704067200000,1,2,0.5,abc,10\n"),
        )
        .unwrap();

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        match adapter.fetch_candles("BTC-EUR", Interval::OneDay) {
            Err(SigtraderError::Data { reason }) => {
                assert!(reason.contains("line 2"), "{reason}");
                assert!(reason.contains("Close"), "{reason}");
            }
            other => panic!("expected data error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_header_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BTC-EUR-1d.csv"),
            "date,open,high,low,close,volume\n2024-01-01,1,2,0.5,1.5,10\n",
        )
        .unwrap();

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert!(matches!(
            adapter.fetch_candles("BTC-EUR", Interval::OneDay),
            Err(SigtraderError::Data { .. })
        ));
    }

    #[test]
    fn repeated_rows_with_nan_collapse() {
        let dir = TempDir::new().unwrap();
        let row = "1704067200000,100.0,110.0,90.0,105.0,NaN\n";
        fs::write(
            dir.path().join("BTC-EUR-1d.csv"),
            format!("{HEADER}{row}{row}"),
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let candles = adapter.fetch_candles("BTC-EUR", Interval::OneDay).unwrap();
        assert_eq!(candles.len(), 1);
        assert!(candles[0].volume.is_nan());
    }

    #[test]
    fn data_range_summarizes_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let range = adapter.data_range("BTC-EUR", Interval::OneDay).unwrap().unwrap();
        assert_eq!(range.first, 1704067200000);
        assert_eq!(range.last, 1704240000000);
        assert_eq!(range.count, 3);

        assert!(adapter.data_range("ETH-EUR", Interval::OneDay).unwrap().is_none());
    }

    #[test]
    fn list_markets_filters_by_interval() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert_eq!(
            adapter.list_markets(Interval::OneDay).unwrap(),
            vec!["BTC-EUR", "ETH-EUR"]
        );
        assert_eq!(adapter.list_markets(Interval::OneHour).unwrap(), vec!["BTC-EUR"]);
        assert!(adapter.list_markets(Interval::OneWeek).unwrap().is_empty());
    }
}
