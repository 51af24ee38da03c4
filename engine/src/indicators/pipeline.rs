// Applies a set of indicator specs to one series.
use super::{calculator_for, Crossover};
use crate::error::IndicatorError;
use serde::Serialize;
use shared::indicator::{IndicatorFrame, IndicatorSpec};
use shared::models::Series;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFailure {
    pub indicator: IndicatorSpec,
    pub error: IndicatorError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub frame: IndicatorFrame,
    pub failures: Vec<IndicatorFailure>,
}

impl IndicatorReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Computes every requested indicator for `series`.
///
/// Column-producing indicators run first, in request order, then crossovers,
/// so a crossover finds its moving averages no matter where they appear in
/// `specs`. A failing indicator is recorded in the report and does not stop
/// the others.
pub fn compute_indicators(series: &Series, specs: &[IndicatorSpec]) -> IndicatorReport {
    let mut frame = IndicatorFrame::from_series(series);
    let mut failures = Vec::new();

    for spec in specs.iter().filter(|s| !s.is_crossover()) {
        let result = calculator_for(spec).and_then(|calculator| calculator.calculate(series));
        match result {
            Ok(columns) => {
                for column in columns {
                    frame.push_column(column);
                }
            }
            Err(error) => {
                tracing::warn!(symbol = %series.symbol(), indicator = %spec, error = %error, "Indicator could not be computed");
                failures.push(IndicatorFailure { indicator: *spec, error });
            }
        }
    }

    for spec in specs.iter().filter(|s| s.is_crossover()) {
        let result = match *spec {
            IndicatorSpec::Crossover { kind, short, long } => spec
                .validate()
                .map_err(|reason| IndicatorError::InvalidParameter {
                    indicator: spec.to_string(),
                    reason,
                })
                .and_then(|_| Crossover::new(kind, short, long).calculate(&frame)),
            _ => continue,
        };
        match result {
            Ok(signal) => frame.push_signal(signal),
            Err(error) => {
                tracing::warn!(symbol = %series.symbol(), indicator = %spec, error = %error, "Crossover could not be computed");
                failures.push(IndicatorFailure { indicator: *spec, error });
            }
        }
    }

    tracing::debug!(
        symbol = %series.symbol(),
        bars = frame.len(),
        columns = frame.columns.len(),
        signals = frame.signals.len(),
        failures = failures.len(),
        "Indicators computed"
    );

    IndicatorReport { frame, failures }
}
