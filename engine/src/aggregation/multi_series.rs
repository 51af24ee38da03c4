use super::pct_change::pct_change_from_first;
use serde::Serialize;
use shared::models::{Bar, Series};

/// One bar of one symbol in the stacked comparison frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiSeriesRow {
    pub symbol: String,
    #[serde(flatten)]
    pub bar: Bar,
    pub pct_change: f64,
}

/// Several symbols' bars stacked one after another ("long" layout). Each
/// symbol keeps its own timestamps; nothing is aligned or joined across symbols.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultiSeriesFrame {
    symbols: Vec<String>,
    rows: Vec<MultiSeriesRow>,
}

impl MultiSeriesFrame {
    pub fn concat(series: &[Series]) -> Self {
        let mut frame = MultiSeriesFrame::default();
        for s in series {
            frame.push(s);
        }
        frame
    }

    /// Appends a symbol's bars, tagged and rebased to their first close.
    /// A symbol already in the frame has its rows replaced and keeps its position.
    pub fn push(&mut self, series: &Series) {
        let symbol = series.symbol().to_string();
        if self.symbols.contains(&symbol) {
            self.rows.retain(|r| r.symbol != symbol);
        } else {
            self.symbols.push(symbol.clone());
        }
        let pct = pct_change_from_first(&series.closes());
        self.rows.extend(series.bars().iter().zip(pct).map(|(bar, pct_change)| MultiSeriesRow {
            symbol: symbol.clone(),
            bar: *bar,
            pct_change,
        }));
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn rows(&self) -> &[MultiSeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a MultiSeriesRow> + 'a {
        self.rows.iter().filter(move |r| r.symbol == symbol)
    }

    pub fn closes_for(&self, symbol: &str) -> Vec<f64> {
        self.rows_for(symbol).map(|r| r.bar.close).collect()
    }
}
