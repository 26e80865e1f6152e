use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("market data error for {symbol}: {msg}")]
    MarketData { symbol: String, msg: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("series error: {0}")]
    Series(#[from] SeriesError),
}

/// Failures of the indicator pipeline. All of them are recoverable: the
/// caller degrades to an undefined series and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("insufficient data: need {needed} usable points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("computation error: {0}")]
    Computation(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("timestamps must be strictly increasing (index {index})")]
    NonMonotonicTimestamp { index: usize },

    #[error("timestamps and closes differ in length ({timestamps} vs {closes})")]
    LengthMismatch { timestamps: usize, closes: usize },
}
