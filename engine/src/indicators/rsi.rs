// Relative Strength Index (RSI) indicator implementation
use super::sma::rolling_mean;
use super::{column, IndicatorCalculator};
use crate::error::IndicatorError;
use serde_json::Value;
use shared::indicator::IndicatorColumn;
use shared::models::Series;

pub const RSI_WINDOW: usize = 14;

/// RSI over percentage changes, with gains and losses averaged by a trailing
/// SMA. The first bar has no previous close and contributes a zero change.
/// Whenever the average loss is zero the value is pinned to 100.
pub fn rsi_values(closes: &[f64], window: usize) -> Vec<f64> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());

    for (i, &close) in closes.iter().enumerate() {
        let change = if i == 0 {
            0.0
        } else {
            (close - closes[i - 1]) / closes[i - 1] * 100.0
        };
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let avg_gain = rolling_mean(&gains, window);
    let avg_loss = rolling_mean(&losses, window);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| {
            if loss == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + gain / loss)
            }
        })
        .collect()
}

pub struct Rsi {
    name: String,
    window: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            name: "RSI".to_string(),
            window: RSI_WINDOW,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window })
    }

    fn calculate(&self, series: &Series) -> Result<Vec<IndicatorColumn>, IndicatorError> {
        let values = rsi_values(&series.closes(), self.window);
        Ok(vec![column(&self.name, self.parameters(), values)])
    }
}
