// Simple Moving Average (SMA) indicator implementation
use super::{column, IndicatorCalculator};
use crate::error::IndicatorError;
use serde_json::Value;
use shared::indicator::{IndicatorColumn, MaKind};
use shared::models::Series;

/// Trailing mean over at most `window` values. The first `window - 1` outputs
/// average whatever history exists (minimum one value), so the result is
/// always the same length as the input and never undefined. A zero window is
/// treated as one.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

pub struct Sma {
    name: String,
    window: usize,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        Self {
            name: MaKind::Sma.column_name(window),
            window,
        }
    }
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window })
    }

    fn calculate(&self, series: &Series) -> Result<Vec<IndicatorColumn>, IndicatorError> {
        let values = rolling_mean(&series.closes(), self.window);
        Ok(vec![column(&self.name, self.parameters(), values)])
    }
}
