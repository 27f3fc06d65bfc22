//! Domain error types.

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("column length mismatch: {column} has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("timestamps not strictly increasing at row {index}: {previous} then {current}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("missing close price at row {index} (timestamp {timestamp})")]
    MissingClose { index: usize, timestamp: i64 },

    #[error("non-positive close price {close} at row {index} (timestamp {timestamp})")]
    NonPositiveClose {
        index: usize,
        timestamp: i64,
        close: f64,
    },

    #[error("invalid trade signal {value} at row {index} (expected 0, 1 or 2)")]
    InvalidSignal { index: usize, value: i64 },

    #[error("signal optimization did not converge after {passes} passes")]
    OptimizerDiverged { passes: usize },

    #[error("run aborted")]
    Aborted,

    #[error("no candle data for {market} at {interval}")]
    NoData { market: String, interval: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SigtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) => 1,
            SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. } => 2,
            SigtraderError::NoData { .. } | SigtraderError::Data { .. } => 3,
            SigtraderError::LengthMismatch { .. }
            | SigtraderError::NonMonotonicTimestamp { .. }
            | SigtraderError::MissingClose { .. }
            | SigtraderError::NonPositiveClose { .. }
            | SigtraderError::InvalidSignal { .. } => 4,
            SigtraderError::OptimizerDiverged { .. } => 5,
            SigtraderError::Aborted => 130,
        };
        std::process::ExitCode::from(code)
    }
}
