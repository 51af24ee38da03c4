// Handler for the single-security view
use std::sync::Arc;

use uuid::Uuid;

use super::fetch_series::fetch_series;
use super::views::{SecurityRequest, SecurityView};
use crate::aggregation::sub_period_performance;
use crate::data::cache::SeriesCache;
use crate::data::market_data::{HistoryRequest, SeriesSource};
use crate::error::EngineError;
use crate::indicators::compute_indicators;

pub async fn handle_render_security(
    request_id: Uuid,
    req_payload: SecurityRequest,
    source: Arc<dyn SeriesSource>,
    cache: &SeriesCache,
) -> Result<SecurityView, EngineError> {
    let history = HistoryRequest::new(&req_payload.symbol, req_payload.range, req_payload.interval)?;
    let series = fetch_series(history.clone(), source, cache).await?;

    if series.is_empty() {
        tracing::warn!(symbol = %history.symbol, range = %history.range, "No bars in the requested range");
    }

    let report = compute_indicators(&series, &req_payload.indicators);
    for failure in &report.failures {
        tracing::warn!(
            symbol = %history.symbol,
            indicator = %failure.indicator,
            error = %failure.error,
            "Indicator not computed"
        );
    }

    let performance = sub_period_performance(series.symbol(), &series.closes());

    Ok(SecurityView {
        request_id,
        symbol: history.symbol,
        range: history.range,
        interval: history.interval,
        performance,
        frame: report.frame,
        failures: report.failures,
    })
}
