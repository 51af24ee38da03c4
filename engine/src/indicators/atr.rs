// Average True Range (ATR) indicator implementation
//
// TR[0] = High - Low
// TR[i] = max(High - Low, |High - prevClose|, |Low - prevClose|)
// ATR   = trailing SMA of TR, averaging the available history at the start.
use super::sma::rolling_mean;
use super::{column, IndicatorCalculator};
use crate::error::IndicatorError;
use serde_json::Value;
use shared::indicator::IndicatorColumn;
use shared::models::Series;

pub const ATR_WINDOW: usize = 14;

/// True range per bar. Fails on the first bar without a high or low, since
/// a close-only series cannot carry a volatility range.
pub fn true_range(series: &Series, indicator: &str) -> Result<Vec<f64>, IndicatorError> {
    let mut ranges = Vec::with_capacity(series.len());
    let mut prev_close: Option<f64> = None;

    for (index, bar) in series.bars().iter().enumerate() {
        let high = bar.high.ok_or_else(|| IndicatorError::MalformedSeries {
            indicator: indicator.to_string(),
            column: "High",
            index,
        })?;
        let low = bar.low.ok_or_else(|| IndicatorError::MalformedSeries {
            indicator: indicator.to_string(),
            column: "Low",
            index,
        })?;

        let hl = high - low;
        let tr = match prev_close {
            None => hl,
            Some(pc) => hl.max((high - pc).abs()).max((low - pc).abs()),
        };
        ranges.push(tr);
        prev_close = Some(bar.close);
    }
    Ok(ranges)
}

pub struct Atr {
    name: String,
    window: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self {
            name: "ATR".to_string(),
            window: ATR_WINDOW,
        }
    }
}

impl IndicatorCalculator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window })
    }

    fn calculate(&self, series: &Series) -> Result<Vec<IndicatorColumn>, IndicatorError> {
        let ranges = true_range(series, &self.name)?;
        let values = rolling_mean(&ranges, self.window);
        Ok(vec![column(&self.name, self.parameters(), values)])
    }
}
