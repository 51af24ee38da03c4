// Technical indicators module
//
// Every calculator is a pure function of the series it is given: outputs are
// aligned 1:1 with the bars, only look backwards, and degrade to the available
// history when a window is longer than the series.
pub mod atr;
pub mod crossover;
pub mod ema;
pub mod macd;
pub mod pipeline;
pub mod rsi;
pub mod sma;

pub use atr::Atr;
pub use crossover::Crossover;
pub use ema::Ema;
pub use macd::Macd;
pub use pipeline::{compute_indicators, IndicatorFailure, IndicatorReport};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::error::IndicatorError;
use serde_json::Value;
use shared::indicator::{IndicatorColumn, IndicatorSpec};
use shared::models::Series;

// Common trait for all column-producing indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, series: &Series) -> Result<Vec<IndicatorColumn>, IndicatorError>;
}

/// Builds the calculator for a validated spec. Crossovers read other columns
/// rather than the series and are handled by [`Crossover`] directly.
pub fn calculator_for(spec: &IndicatorSpec) -> Result<Box<dyn IndicatorCalculator>, IndicatorError> {
    spec.validate().map_err(|reason| IndicatorError::InvalidParameter {
        indicator: spec.to_string(),
        reason,
    })?;

    let calculator: Box<dyn IndicatorCalculator> = match *spec {
        IndicatorSpec::Sma { window } => Box::new(Sma::new(window)),
        IndicatorSpec::Ema { span } => Box::new(Ema::new(span)),
        IndicatorSpec::Atr => Box::new(Atr::default()),
        IndicatorSpec::Macd => Box::new(Macd::default()),
        IndicatorSpec::Rsi => Box::new(Rsi::default()),
        IndicatorSpec::Crossover { .. } => {
            return Err(IndicatorError::InvalidParameter {
                indicator: spec.to_string(),
                reason: "crossovers are computed from existing moving-average columns".to_string(),
            })
        }
    };
    Ok(calculator)
}

pub(crate) fn column(name: &str, parameters: Value, values: Vec<f64>) -> IndicatorColumn {
    IndicatorColumn {
        name: name.to_string(),
        parameters,
        values,
    }
}
