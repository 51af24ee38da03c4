// Moving-average crossover signal
use crate::error::IndicatorError;
use shared::indicator::{CrossoverSignal, IndicatorFrame, IndicatorSpec, MaKind};

/// `+1` where `short` moves from at-or-below `long` to above it, `-1` where it
/// moves from at-or-above to below, `0` elsewhere (including the first bar).
pub fn crossover(short: &[f64], long: &[f64]) -> Vec<i8> {
    let len = short.len().min(long.len());
    (0..len)
        .map(|i| {
            if i == 0 {
                return 0;
            }
            let (prev_short, prev_long) = (short[i - 1], long[i - 1]);
            let (cur_short, cur_long) = (short[i], long[i]);
            if prev_short <= prev_long && cur_short > cur_long {
                1
            } else if prev_short >= prev_long && cur_short < cur_long {
                -1
            } else {
                0
            }
        })
        .collect()
}

pub struct Crossover {
    name: String,
    kind: MaKind,
    short: usize,
    long: usize,
}

impl Crossover {
    pub fn new(kind: MaKind, short: usize, long: usize) -> Self {
        Self {
            name: IndicatorSpec::Crossover { kind, short, long }.to_string(),
            kind,
            short,
            long,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the two moving-average columns from `frame`; both must already be there.
    pub fn calculate(&self, frame: &IndicatorFrame) -> Result<CrossoverSignal, IndicatorError> {
        let short = self.require(frame, self.short)?;
        let long = self.require(frame, self.long)?;
        Ok(CrossoverSignal {
            name: self.name.clone(),
            kind: self.kind,
            short: self.short,
            long: self.long,
            values: crossover(short, long),
        })
    }

    fn require<'a>(&self, frame: &'a IndicatorFrame, window: usize) -> Result<&'a [f64], IndicatorError> {
        let column_name = self.kind.column_name(window);
        frame
            .column(&column_name)
            .map(|c| c.values.as_slice())
            .ok_or(IndicatorError::MissingDependency {
                indicator: self.name.clone(),
                column: column_name,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::sma::rolling_mean;
    use crate::indicators::test_support::series_from_closes;
    use shared::indicator::IndicatorColumn;

    #[test]
    fn test_single_golden_cross() {
        // Flat, then rising: SMA_5 leaves SMA_20 upwards once and stays above.
        let mut closes = vec![50.0; 25];
        closes.extend((1..=15).map(|i| 50.0 + i as f64));
        let signal = crossover(&rolling_mean(&closes, 5), &rolling_mean(&closes, 20));
        assert_eq!(signal.iter().filter(|v| **v == 1).count(), 1);
        assert_eq!(signal.iter().filter(|v| **v == -1).count(), 0);
        assert_eq!(signal[25], 1);
    }

    #[test]
    fn test_death_then_golden_cross() {
        let short = [5.0, 4.0, 3.0, 3.0, 6.0];
        let long = [4.0, 4.0, 4.0, 4.0, 4.0];
        assert_eq!(crossover(&short, &long), vec![0, 0, -1, 0, 1]);
    }

    #[test]
    fn test_touch_then_cross_marks_the_cross() {
        let short = [1.0, 2.0, 3.0];
        let long = [2.0, 2.0, 2.0];
        assert_eq!(crossover(&short, &long), vec![0, 0, 1]);
    }

    #[test]
    fn test_crossover_is_antisymmetric() {
        let a: Vec<f64> = (0..50).map(|i| (i as f64 * 0.4).sin()).collect();
        let b: Vec<f64> = (0..50).map(|i| (i as f64 * 0.25).cos() * 0.8).collect();
        let forward = crossover(&a, &b);
        let swapped = crossover(&b, &a);
        assert!(forward.iter().any(|v| *v != 0));
        for (f, s) in forward.iter().zip(&swapped) {
            assert_eq!(*f, -*s);
        }
    }

    #[test]
    fn test_crossover_antisymmetric_with_ties() {
        let a = [1.0, 2.0, 2.0, 3.0, 2.0, 2.0, 1.0];
        let b = [2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0];
        let forward = crossover(&a, &b);
        let swapped: Vec<i8> = crossover(&b, &a).iter().map(|v| -v).collect();
        assert_eq!(forward, swapped);
    }

    #[test]
    fn test_crossover_reads_frame_columns() {
        let closes = [3.0, 2.0, 1.0, 4.0, 6.0];
        let series = series_from_closes(&closes);
        let mut frame = IndicatorFrame::from_series(&series);
        for window in [2, 3] {
            frame.push_column(IndicatorColumn {
                name: MaKind::Sma.column_name(window),
                parameters: serde_json::json!({ "window": window }),
                values: rolling_mean(&closes, window),
            });
        }
        let signal = Crossover::new(MaKind::Sma, 2, 3).calculate(&frame).unwrap();
        assert_eq!(signal.name, "Crossover_SMA_2/3");
        assert_eq!(signal.values.len(), 5);
        assert_eq!(signal.bullish_indices(), vec![3]);
    }

    #[test]
    fn test_crossover_missing_column() {
        let series = series_from_closes(&[1.0, 2.0]);
        let frame = IndicatorFrame::from_series(&series);
        let err = Crossover::new(MaKind::Ema, 12, 26).calculate(&frame).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::MissingDependency {
                indicator: "Crossover_EMA_12/26".to_string(),
                column: "EMA_12".to_string(),
            }
        );
    }
}
