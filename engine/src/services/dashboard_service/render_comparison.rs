// Handler for the multi-symbol comparison view
use std::sync::Arc;

use uuid::Uuid;

use super::fetch_series::fetch_series;
use super::views::{ComparisonRequest, ComparisonView, SymbolFailure};
use crate::aggregation::{performance_table, MultiSeriesFrame};
use crate::data::cache::SeriesCache;
use crate::data::market_data::{HistoryRange, HistoryRequest, SeriesSource};
use crate::error::EngineError;

/// Upper-cased, blank entries dropped, first occurrence kept.
fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() && !unique.contains(&symbol) {
            unique.push(symbol);
        }
    }
    unique
}

pub async fn handle_render_comparison(
    request_id: Uuid,
    req_payload: ComparisonRequest,
    source: Arc<dyn SeriesSource>,
    cache: &SeriesCache,
) -> Result<ComparisonView, EngineError> {
    let symbols = normalize_symbols(&req_payload.symbols);
    if symbols.is_empty() {
        return Err(EngineError::InvalidRequest("At least one symbol is required".to_string()));
    }
    if let HistoryRange::Period(period) = req_payload.range {
        if !req_payload.interval.fits_period(period) {
            return Err(EngineError::InvalidRequest(format!(
                "Interval {} is not finer than period {}",
                req_payload.interval, period
            )));
        }
    }

    let mut frame = MultiSeriesFrame::default();
    let mut failed = Vec::new();

    for symbol in symbols {
        let fetched = match HistoryRequest::new(&symbol, req_payload.range, req_payload.interval) {
            Ok(history) => fetch_series(history, source.clone(), cache).await,
            Err(e) => Err(e),
        };
        match fetched {
            Ok(series) => frame.push(&series),
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Symbol left out of comparison");
                failed.push(SymbolFailure {
                    symbol,
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }

    let performance = performance_table(&frame);
    tracing::debug!(
        symbols = frame.symbols().len(),
        rows = frame.len(),
        failed = failed.len(),
        "Comparison frame built"
    );

    Ok(ComparisonView {
        request_id,
        range: req_payload.range,
        interval: req_payload.interval,
        frame,
        performance,
        failed,
    })
}
