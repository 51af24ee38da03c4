/// Rebases closes to their first value: `(close[i] - close[0]) / close[0]`.
/// The first entry is always exactly zero, which lets symbols with very
/// different price levels share one percent-change chart.
pub fn pct_change_from_first(closes: &[f64]) -> Vec<f64> {
    let Some(&base) = closes.first() else {
        return Vec::new();
    };
    closes.iter().map(|&close| (close - base) / base).collect()
}
