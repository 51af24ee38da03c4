// Display helpers shared across the engine and its consumers.

/// Formats a percentage with an explicit sign for gains, e.g. `+1.25%` / `-0.40%`.
pub fn format_pct(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}
