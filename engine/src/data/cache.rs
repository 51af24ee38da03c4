use crate::data::market_data::HistoryRequest;
use moka::future::Cache;
use shared::models::Series;
use std::sync::Arc;
use std::time::Duration;

/// Fetched series keyed by the full request (symbol, range and interval).
/// Entries expire after `ttl`; past `capacity` moka evicts by its own policy.
pub struct SeriesCache {
    entries: Cache<HistoryRequest, Arc<Series>>,
    ttl: Duration,
}

impl SeriesCache {
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        SeriesCache { entries, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &HistoryRequest) -> Option<Arc<Series>> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: HistoryRequest, series: Arc<Series>) {
        self.entries.insert(key, series).await;
    }

    pub async fn invalidate(&self, key: &HistoryRequest) {
        self.entries.invalidate(key).await;
    }

    /// Drops every entry and returns how many were live beforehand.
    pub async fn clear(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        let count = self.entries.entry_count();
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
        count
    }

    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::market_data::HistoryRange;
    use chrono::{TimeZone, Utc};
    use shared::models::{Bar, Interval, Period};

    fn request(symbol: &str) -> HistoryRequest {
        HistoryRequest::new(symbol, HistoryRange::Period(Period::Month1), Interval::Day1).unwrap()
    }

    fn series(symbol: &str) -> Arc<Series> {
        let ts = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        Arc::new(Series::new(symbol, Interval::Day1, vec![Bar::close_only(ts, 10.0)]).unwrap())
    }

    #[tokio::test]
    async fn test_get_returns_inserted_series() {
        let cache = SeriesCache::new(Duration::from_secs(60), 8);
        cache.insert(request("AAPL"), series("AAPL")).await;

        let hit = cache.get(&request("aapl")).await.unwrap();
        assert_eq!(hit.symbol(), "AAPL");
        assert!(cache.get(&request("MSFT")).await.is_none());
    }

    #[tokio::test]
    async fn test_key_includes_range_and_interval() {
        let cache = SeriesCache::new(Duration::from_secs(60), 8);
        cache.insert(request("AAPL"), series("AAPL")).await;

        let weekly = HistoryRequest::new("AAPL", HistoryRange::Period(Period::Month1), Interval::Week1).unwrap();
        let longer = HistoryRequest::new("AAPL", HistoryRange::Period(Period::Year1), Interval::Day1).unwrap();
        assert!(cache.get(&weekly).await.is_none());
        assert!(cache.get(&longer).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_returned() {
        let cache = SeriesCache::new(Duration::from_millis(50), 8);
        cache.insert(request("EURUSD=X"), series("EURUSD=X")).await;
        assert!(cache.get(&request("EURUSD=X")).await.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get(&request("EURUSD=X")).await.is_none());
    }

    #[tokio::test]
    async fn test_capacity_bounds_entry_count() {
        let cache = SeriesCache::new(Duration::from_secs(60), 2);
        for symbol in ["A", "B", "C", "D"] {
            cache.insert(request(symbol), series(symbol)).await;
        }
        assert!(cache.entry_count().await <= 2);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache = SeriesCache::new(Duration::from_secs(60), 8);
        cache.insert(request("A"), series("A")).await;
        cache.insert(request("B"), series("B")).await;

        cache.invalidate(&request("A")).await;
        assert!(cache.get(&request("A")).await.is_none());
        assert!(cache.get(&request("B")).await.is_some());

        assert_eq!(cache.clear().await, 1);
        assert_eq!(cache.entry_count().await, 0);
        assert!(cache.get(&request("B")).await.is_none());
    }
}
