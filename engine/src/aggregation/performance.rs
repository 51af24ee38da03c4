use super::multi_series::MultiSeriesFrame;
use serde::Serialize;
use shared::utils::format_pct;

/// Reference points the last close is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceWindow {
    #[serde(rename = "Last value")]
    LastValue,
    #[serde(rename = "1/4 Period")]
    QuarterPeriod,
    #[serde(rename = "1/2 Period")]
    HalfPeriod,
    #[serde(rename = "1 Period")]
    FullPeriod,
}

impl PerformanceWindow {
    /// Row order of the performance table.
    pub const ROWS: [PerformanceWindow; 4] = [
        PerformanceWindow::LastValue,
        PerformanceWindow::QuarterPeriod,
        PerformanceWindow::HalfPeriod,
        PerformanceWindow::FullPeriod,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceWindow::LastValue => "Last value",
            PerformanceWindow::QuarterPeriod => "1/4 Period",
            PerformanceWindow::HalfPeriod => "1/2 Period",
            PerformanceWindow::FullPeriod => "1 Period",
        }
    }

    /// Index of the reference bar in a series of `len > 0` bars. The previous
    /// bar for `LastValue` clamps to the only bar of a single-bar series.
    pub fn reference_index(&self, len: usize) -> usize {
        match self {
            PerformanceWindow::LastValue => len.saturating_sub(2),
            PerformanceWindow::QuarterPeriod => len / 4,
            PerformanceWindow::HalfPeriod => len / 2,
            PerformanceWindow::FullPeriod => 0,
        }
    }
}

/// Percent change (×100) from each reference bar to the last bar of one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubPeriodPerformance {
    pub symbol: String,
    pub changes: Vec<(PerformanceWindow, f64)>,
}

impl SubPeriodPerformance {
    pub fn get(&self, window: PerformanceWindow) -> Option<f64> {
        self.changes.iter().find(|(w, _)| *w == window).map(|(_, v)| *v)
    }
}

/// `None` for an empty series.
pub fn sub_period_performance(symbol: &str, closes: &[f64]) -> Option<SubPeriodPerformance> {
    let last = *closes.last()?;
    let changes = PerformanceWindow::ROWS
        .iter()
        .map(|window| {
            let reference = closes[window.reference_index(closes.len())];
            (*window, (last - reference) / reference * 100.0)
        })
        .collect();
    Some(SubPeriodPerformance {
        symbol: symbol.to_string(),
        changes,
    })
}

/// Fixed four-row comparison table; one column per symbol with data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceTable {
    pub columns: Vec<SubPeriodPerformance>,
    /// Symbols present in the frame without any bars.
    pub skipped: Vec<String>,
}

impl PerformanceTable {
    pub fn rows(&self) -> Vec<(PerformanceWindow, Vec<f64>)> {
        PerformanceWindow::ROWS
            .iter()
            .map(|window| (*window, self.columns.iter().filter_map(|c| c.get(*window)).collect()))
            .collect()
    }

    pub fn column(&self, symbol: &str) -> Option<&SubPeriodPerformance> {
        self.columns.iter().find(|c| c.symbol == symbol)
    }

    /// Same rows with each cell rendered as a signed percentage, e.g. `+1.25%`.
    pub fn formatted_rows(&self) -> Vec<(&'static str, Vec<String>)> {
        self.rows()
            .into_iter()
            .map(|(window, values)| (window.label(), values.into_iter().map(format_pct).collect()))
            .collect()
    }
}

pub fn performance_table(frame: &MultiSeriesFrame) -> PerformanceTable {
    let mut table = PerformanceTable::default();
    for symbol in frame.symbols() {
        match sub_period_performance(symbol, &frame.closes_for(symbol)) {
            Some(perf) => table.columns.push(perf),
            None => {
                tracing::warn!(symbol = %symbol, "No bars for symbol; excluded from performance table");
                table.skipped.push(symbol.clone());
            }
        }
    }
    table
}
