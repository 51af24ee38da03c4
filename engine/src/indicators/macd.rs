// Moving Average Convergence-Divergence (MACD) indicator implementation
use super::ema::ewm;
use super::{column, IndicatorCalculator};
use crate::error::IndicatorError;
use serde_json::Value;
use shared::indicator::IndicatorColumn;
use shared::models::Series;

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD = EMA(fast) - EMA(slow), Signal = EMA(signal) of MACD and
/// Histogram = MACD - Signal, computed element-wise from the two stored lines.
pub fn macd_lines(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdLines {
    let fast_ema = ewm(closes, fast);
    let slow_ema = ewm(closes, slow);
    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ewm(&macd, signal_span);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
    MacdLines { macd, signal, histogram }
}

pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: FAST_SPAN,
            slow: SLOW_SPAN,
            signal: SIGNAL_SPAN,
        }
    }
}

impl IndicatorCalculator for Macd {
    fn name(&self) -> &str {
        "MACD"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "fast": self.fast, "slow": self.slow, "signal": self.signal })
    }

    fn calculate(&self, series: &Series) -> Result<Vec<IndicatorColumn>, IndicatorError> {
        let lines = macd_lines(&series.closes(), self.fast, self.slow, self.signal);
        let params = self.parameters();
        Ok(vec![
            column("MACD", params.clone(), lines.macd),
            column("Signal", params.clone(), lines.signal),
            column("MACD_Hist", params, lines.histogram),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_close, series_from_closes};

    #[test]
    fn test_macd_produces_three_aligned_columns() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let series = series_from_closes(&closes);
        let columns = Macd::default().calculate(&series).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["MACD", "Signal", "MACD_Hist"]);
        assert!(columns.iter().all(|c| c.values.len() == 40));
    }

    #[test]
    fn test_histogram_identity_is_exact() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.31).cos() * 7.3 + i as f64 * 0.1).collect();
        let lines = macd_lines(&closes, FAST_SPAN, SLOW_SPAN, SIGNAL_SPAN);
        for i in 0..closes.len() {
            assert_eq!(lines.histogram[i], lines.macd[i] - lines.signal[i]);
        }
    }

    #[test]
    fn test_macd_starts_at_zero() {
        let lines = macd_lines(&[10.0, 11.0], FAST_SPAN, SLOW_SPAN, SIGNAL_SPAN);
        assert_eq!(lines.macd[0], 0.0);
        assert_eq!(lines.signal[0], 0.0);
        assert_eq!(lines.histogram[0], 0.0);
        assert!(lines.macd[1] > 0.0);
    }

    #[test]
    fn test_macd_of_flat_series_is_zero() {
        let lines = macd_lines(&[42.0; 30], FAST_SPAN, SLOW_SPAN, SIGNAL_SPAN);
        assert_close(&lines.histogram, &[0.0; 30]);
    }
}
