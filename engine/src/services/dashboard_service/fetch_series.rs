// Cache-first series lookup shared by the render handlers
use std::sync::Arc;

use crate::data::cache::SeriesCache;
use crate::data::market_data::{HistoryRequest, SeriesSource};
use crate::error::EngineError;
use shared::models::Series;

pub(super) async fn fetch_series(
    request: HistoryRequest,
    source: Arc<dyn SeriesSource>,
    cache: &SeriesCache,
) -> Result<Arc<Series>, EngineError> {
    if let Some(series) = cache.get(&request).await {
        tracing::debug!(symbol = %request.symbol, range = %request.range, bars = series.len(), "Series cache hit");
        return Ok(series);
    }

    // Sources may block on disk or network I/O.
    let blocking_request = request.clone();
    let series = tokio::task::spawn_blocking(move || source.fetch(&blocking_request))
        .await
        .map_err(anyhow::Error::from)??;

    tracing::debug!(symbol = %request.symbol, range = %request.range, bars = series.len(), "Series cache miss, fetched from source");
    let series = Arc::new(series);
    cache.insert(request, series.clone()).await;
    Ok(series)
}
