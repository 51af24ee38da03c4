// Exponential Moving Average (EMA) indicator implementation
use super::{column, IndicatorCalculator};
use crate::error::IndicatorError;
use serde_json::Value;
use shared::indicator::{IndicatorColumn, MaKind};
use shared::models::Series;

/// Recursive EMA with `alpha = 2 / (span + 1)`, seeded with the first value
/// (the non-adjusted form): every output depends only on the previous output
/// and the current input, so values never change when bars are appended.
pub fn ewm(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut results = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;

    for &value in values {
        let ema = match previous {
            None => value,
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
        };
        results.push(ema);
        previous = Some(ema);
    }
    results
}

pub struct Ema {
    name: String,
    span: usize,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self {
            name: MaKind::Ema.column_name(span),
            span,
        }
    }
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "span": self.span })
    }

    fn calculate(&self, series: &Series) -> Result<Vec<IndicatorColumn>, IndicatorError> {
        let values = ewm(&series.closes(), self.span);
        Ok(vec![column(&self.name, self.parameters(), values)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::series_from_closes;

    #[test]
    fn test_ema_calculation() {
        let series = series_from_closes(&[10.0, 11.0, 12.0, 11.0, 10.0]);
        let columns = Ema::new(3).calculate(&series).unwrap();
        // alpha = 0.5, seeded with the first close
        assert_eq!(columns[0].name, "EMA_3");
        assert_eq!(columns[0].values, vec![10.0, 10.5, 11.25, 11.125, 10.5625]);
    }

    #[test]
    fn test_ema_span_one_is_identity() {
        let closes = [3.7, 1.2, 9.9, 4.4, 4.4, 100.25];
        assert_eq!(ewm(&closes, 1), closes.to_vec());
    }

    #[test]
    fn test_ema_is_causal() {
        let closes = [10.0, 12.0, 11.0, 15.0, 14.0, 13.0];
        let full = ewm(&closes, 4);
        let prefix = ewm(&closes[..3], 4);
        assert_eq!(&full[..3], prefix.as_slice());
    }

    #[test]
    fn test_ema_empty_data() {
        assert!(ewm(&[], 12).is_empty());
    }
}
