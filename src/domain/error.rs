//! Domain error types.

use chrono::NaiveTime;

/// Top-level error type for quarteredge.
#[derive(Debug, thiserror::Error)]
pub enum QuarterEdgeError {
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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("invalid candle at {time}: {reason}")]
    InvalidCandle { time: NaiveTime, reason: String },

    #[error("candle at {current} arrived after {previous}")]
    OutOfOrder {
        previous: NaiveTime,
        current: NaiveTime,
    },

    #[error("strategy error: {reason}")]
    Strategy { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuarterEdgeError> for std::process::ExitCode {
    fn from(err: &QuarterEdgeError) -> Self {
        let code: u8 = match err {
            QuarterEdgeError::Io(_) => 1,
            QuarterEdgeError::ConfigParse { .. }
            | QuarterEdgeError::ConfigMissing { .. }
            | QuarterEdgeError::ConfigInvalid { .. } => 2,
            QuarterEdgeError::Data { .. } => 3,
            QuarterEdgeError::InvalidCandle { .. }
            | QuarterEdgeError::OutOfOrder { .. }
            | QuarterEdgeError::Strategy { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
