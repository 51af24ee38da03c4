// engine/src/services/dashboard_service/mod.rs
// DashboardService owns the series source and cache; each view is built by
// the handler in its sibling module.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::EngineSettings;
use crate::data::cache::SeriesCache;
use crate::data::market_data::{CsvSeriesSource, SeriesSource};
use crate::error::EngineError;

mod fetch_series;
pub mod render_comparison;
pub mod render_security;
pub mod views;

pub use views::{ComparisonRequest, ComparisonView, SecurityRequest, SecurityView, SymbolFailure};

pub struct DashboardService {
    source: Arc<dyn SeriesSource>,
    cache: Arc<SeriesCache>,
}

impl DashboardService {
    pub fn new(source: Arc<dyn SeriesSource>, cache: Arc<SeriesCache>) -> Self {
        DashboardService { source, cache }
    }

    /// CSV-backed service configured from `settings`.
    pub fn from_settings(settings: &EngineSettings) -> Self {
        let source = CsvSeriesSource::new(settings.data_dir.clone(), settings.csv.clone());
        let cache = SeriesCache::new(settings.cache_ttl(), settings.cache_capacity);
        tracing::debug!(
            data_dir = %settings.data_dir.display(),
            ttl_secs = cache.ttl().as_secs(),
            capacity = settings.cache_capacity,
            "Dashboard service configured"
        );
        DashboardService::new(Arc::new(source), Arc::new(cache))
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    pub async fn render_security(&self, req_payload: SecurityRequest) -> Result<SecurityView, EngineError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "render_security",
            %request_id,
            symbol = %req_payload.symbol,
            range = %req_payload.range,
            interval = %req_payload.interval
        );
        async move {
            tracing::info!(indicators = req_payload.indicators.len(), "Received security view request, dispatching to handler.");
            let result =
                render_security::handle_render_security(request_id, req_payload, self.source.clone(), &self.cache).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, kind = e.kind(), "Security view failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    pub async fn render_comparison(&self, req_payload: ComparisonRequest) -> Result<ComparisonView, EngineError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "render_comparison",
            %request_id,
            range = %req_payload.range,
            interval = %req_payload.interval
        );
        async move {
            tracing::info!(symbols = ?req_payload.symbols, "Received comparison request, dispatching to handler.");
            let result =
                render_comparison::handle_render_comparison(request_id, req_payload, self.source.clone(), &self.cache).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, kind = e.kind(), "Comparison view failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Drops every cached series so the next render refetches.
    pub async fn refresh(&self) -> DateTime<Utc> {
        let cleared = self.cache.clear().await;
        let refreshed_at = Utc::now();
        tracing::info!(cleared, %refreshed_at, "Series cache cleared");
        refreshed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::PerformanceWindow;
    use crate::data::market_data::{HistoryRange, HistoryRequest, MarketDataStore};
    use chrono::{Duration, NaiveDate, TimeZone};
    use shared::indicator::IndicatorSpec;
    use shared::models::{Bar, Interval, Period, Series};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    struct CountingSource {
        inner: MarketDataStore,
        calls: AtomicUsize,
    }

    impl SeriesSource for CountingSource {
        fn fetch(&self, request: &HistoryRequest) -> Result<Series, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(request)
        }
    }

    fn daily_bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), c, c + 1.0, c - 1.0, c, Some(1_000)))
            .collect()
    }

    fn create_test_service() -> (DashboardService, Arc<CountingSource>) {
        let mut store = MarketDataStore::new();
        store.add_bars("AAPL", Interval::Day1, daily_bars(&[100.0, 102.0, 101.0, 105.0, 103.0]));
        store.add_bars("MSFT", Interval::Day1, daily_bars(&[50.0, 45.0]));
        let source = Arc::new(CountingSource {
            inner: store,
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(SeriesCache::new(StdDuration::from_secs(60), 16));
        (DashboardService::new(source.clone(), cache), source)
    }

    fn security_request(symbol: &str, indicators: &[&str]) -> SecurityRequest {
        SecurityRequest {
            symbol: symbol.to_string(),
            range: HistoryRange::Period(Period::Max),
            interval: Interval::Day1,
            indicators: indicators.iter().map(|t| t.parse().unwrap()).collect(),
        }
    }

    #[tokio::test]
    async fn test_render_security_computes_indicators_and_performance() {
        let (service, _) = create_test_service();
        let view = service
            .render_security(security_request("aapl", &["SMA_3", "RSI", "Crossover_SMA_2/3", "SMA_2"]))
            .await
            .unwrap();

        assert_eq!(view.symbol, "AAPL");
        assert_eq!(view.frame.len(), 5);
        assert!(view.failures.is_empty());
        assert!(view.frame.column("SMA_3").is_some());
        assert!(view.frame.signal("Crossover_SMA_2/3").is_some());
        let rsi = &view.frame.column("RSI").unwrap().values;
        assert!(rsi[4] > 0.0 && rsi[4] < 100.0);

        let perf = view.performance.unwrap();
        assert!((perf.get(PerformanceWindow::FullPeriod).unwrap() - 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_render_security_reports_failed_indicator() {
        let (service, _) = create_test_service();
        let view = service
            .render_security(security_request("AAPL", &["Crossover_EMA_5/10", "EMA_3"]))
            .await
            .unwrap();

        assert_eq!(view.failures.len(), 1);
        assert_eq!(view.failures[0].indicator.to_string(), "Crossover_EMA_5/10");
        assert!(view.frame.column("EMA_3").is_some());
    }

    #[tokio::test]
    async fn test_render_security_unknown_symbol() {
        let (service, _) = create_test_service();
        let err = service.render_security(security_request("NOPE", &[])).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_render_security_empty_range_has_no_performance() {
        let (service, _) = create_test_service();
        let mut req = security_request("AAPL", &["SMA_20"]);
        req.range = HistoryRange::Start(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let view = service.render_security(req).await.unwrap();
        assert!(view.frame.is_empty());
        assert!(view.performance.is_none());
        assert_eq!(view.frame.column("SMA_20").unwrap().values.len(), 0);
    }

    #[tokio::test]
    async fn test_series_are_served_from_cache_until_refresh() {
        let (service, source) = create_test_service();
        service.render_security(security_request("AAPL", &[])).await.unwrap();
        service.render_security(security_request("AAPL", &["MACD"])).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        service.refresh().await;
        assert_eq!(service.cache().entry_count().await, 0);
        service.render_security(security_request("AAPL", &[])).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_render_comparison_keeps_going_past_failures() {
        let (service, _) = create_test_service();
        let view = service
            .render_comparison(ComparisonRequest {
                symbols: vec!["AAPL".into(), "GHOST".into(), "msft".into(), "aapl".into()],
                range: HistoryRange::Period(Period::Max),
                interval: Interval::Day1,
            })
            .await
            .unwrap();

        assert_eq!(view.frame.symbols(), &["AAPL".to_string(), "MSFT".to_string()]);
        assert_eq!(view.frame.len(), 7);
        assert_eq!(view.failed.len(), 1);
        assert_eq!(view.failed[0].symbol, "GHOST");
        assert_eq!(view.failed[0].kind, "not_found");

        let msft = view.performance.column("MSFT").unwrap();
        assert!((msft.get(PerformanceWindow::FullPeriod).unwrap() + 10.0).abs() < 1e-9);
        for symbol in view.frame.symbols() {
            assert_eq!(view.frame.rows_for(symbol).next().unwrap().pct_change, 0.0);
        }
    }

    #[tokio::test]
    async fn test_render_comparison_rejects_bad_requests() {
        let (service, _) = create_test_service();
        let empty = ComparisonRequest {
            symbols: vec![" ".into()],
            range: HistoryRange::Period(Period::Max),
            interval: Interval::Day1,
        };
        assert_eq!(service.render_comparison(empty).await.unwrap_err().kind(), "invalid_request");

        let incompatible = ComparisonRequest {
            symbols: vec!["AAPL".into()],
            range: HistoryRange::Period(Period::Day1),
            interval: Interval::Day1,
        };
        assert_eq!(service.render_comparison(incompatible).await.unwrap_err().kind(), "invalid_request");
    }

    #[test]
    fn test_indicator_tokens_in_requests() {
        let req: SecurityRequest = serde_json::from_str(
            r#"{ "symbol": "AAPL", "range": { "period": "6mo" }, "interval": "1d", "indicators": ["SMA_20", "Crossover_SMA_20/50"] }"#,
        )
        .unwrap();
        assert_eq!(req.range, HistoryRange::Period(Period::Month6));
        assert_eq!(req.indicators[1], IndicatorSpec::Crossover { kind: shared::indicator::MaKind::Sma, short: 20, long: 50 });
    }
}
