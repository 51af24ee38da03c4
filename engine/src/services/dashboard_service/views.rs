// Request and response payloads of the dashboard service
use crate::aggregation::{MultiSeriesFrame, PerformanceTable, SubPeriodPerformance};
use crate::data::market_data::HistoryRange;
use crate::indicators::IndicatorFailure;
use serde::{Deserialize, Serialize};
use shared::indicator::{IndicatorFrame, IndicatorSpec};
use shared::models::Interval;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SecurityRequest {
    pub symbol: String,
    pub range: HistoryRange,
    pub interval: Interval,
    #[serde(default)]
    pub indicators: Vec<IndicatorSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComparisonRequest {
    pub symbols: Vec<String>,
    pub range: HistoryRange,
    pub interval: Interval,
}

/// Single-symbol page: bars with their indicator columns and signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityView {
    pub request_id: Uuid,
    pub symbol: String,
    pub range: HistoryRange,
    pub interval: Interval,
    /// `None` when the range holds no bars.
    pub performance: Option<SubPeriodPerformance>,
    pub frame: IndicatorFrame,
    pub failures: Vec<IndicatorFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonView {
    pub request_id: Uuid,
    pub range: HistoryRange,
    pub interval: Interval,
    pub frame: MultiSeriesFrame,
    pub performance: PerformanceTable,
    pub failed: Vec<SymbolFailure>,
}
