use serde::Serialize;
use shared::models::SeriesError;
use thiserror::Error;

/// Why a single indicator could not be computed. Insufficient history and
/// zero denominators are not errors: they degrade to the available window and
/// to the indicator's limiting value respectively.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorError {
    #[error("{indicator} requires '{column}' but bar {index} has none")]
    MalformedSeries {
        indicator: String,
        column: &'static str,
        index: usize,
    },

    #[error("{indicator} requires column '{column}' to be computed first")]
    MissingDependency { indicator: String, column: String },

    #[error("{indicator}: {reason}")]
    InvalidParameter { indicator: String, reason: String },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Market data error: {0}")]
    MarketDataError(String),

    #[error("Invalid series: {source}")]
    SeriesError {
        #[from]
        source: SeriesError,
    },

    #[error("Indicator calculation error: {0}")]
    IndicatorError(#[from] IndicatorError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Catch-all for anyhow errors when direct conversion is suitable
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    /// Short machine-readable category, used when failures are reported
    /// alongside successful results instead of aborting a request.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::ConfigError(_) => "config",
            EngineError::CsvSystemError { .. } | EngineError::CsvDataFormatError(_) => "csv",
            EngineError::IoError { .. } => "io",
            EngineError::MarketDataError(msg) if msg.to_lowercase().contains("not found") => "not_found",
            EngineError::MarketDataError(_) => "market_data",
            EngineError::SeriesError { .. } => "malformed_series",
            EngineError::IndicatorError(_) => "indicator",
            EngineError::InvalidRequest(_) => "invalid_request",
            EngineError::AnyhowError(_) => "internal",
        }
    }
}
