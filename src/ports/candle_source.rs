//! Candle data access port.

use crate::domain::candle::Candle;
use crate::domain::error::SigtraderError;
use crate::domain::interval::Interval;

/// First and last candle timestamp (ms) and the number of candles stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRange {
    pub first: i64,
    pub last: i64,
    pub count: usize,
}

impl DataRange {
    /// `None` for an empty slice. Expects candles sorted by timestamp.
    pub fn of(candles: &[Candle]) -> Option<Self> {
        match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => Some(DataRange {
                first: first.timestamp,
                last: last.timestamp,
                count: candles.len(),
            }),
            _ => None,
        }
    }
}

pub trait CandleSource {
    /// All stored candles for the market, sorted by timestamp.
    fn fetch_candles(&self, market: &str, interval: Interval)
    -> Result<Vec<Candle>, SigtraderError>;

    /// `None` when the market has no stored candles.
    fn data_range(
        &self,
        market: &str,
        interval: Interval,
    ) -> Result<Option<DataRange>, SigtraderError> {
        let candles = self.fetch_candles(market, interval)?;
        Ok(DataRange::of(&candles))
    }
}
