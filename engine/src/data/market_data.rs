// Series sources: where a request's bars come from, and how a period is cut out of them.
use crate::data::csv_parser::{CsvOptions, OhlcvCsvParser};
use crate::error::EngineError;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Bar, Interval, Period, Series};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Either a look-back period ending at the latest bar, or an explicit start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryRange {
    Period(Period),
    Start(NaiveDate),
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryRange::Period(p) => write!(f, "{}", p),
            HistoryRange::Start(d) => write!(f, "start={}", d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HistoryRequest {
    pub symbol: String,
    pub range: HistoryRange,
    pub interval: Interval,
}

impl HistoryRequest {
    /// Normalizes the symbol (trimmed, upper-case) and rejects interval/period
    /// combinations that cannot produce more than one bar. Symbols name files
    /// under the data directory, so path separators and `..` are refused.
    pub fn new(symbol: &str, range: HistoryRange, interval: Interval) -> Result<Self, EngineError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(EngineError::InvalidRequest("Symbol must not be empty".to_string()));
        }
        if symbol.contains('/') || symbol.contains('\\') || symbol.contains("..") {
            return Err(EngineError::InvalidRequest(format!("Invalid symbol '{}'", symbol)));
        }
        if let HistoryRange::Period(period) = range {
            if !interval.fits_period(period) {
                return Err(EngineError::InvalidRequest(format!(
                    "Interval {} is not finer than period {}",
                    interval, period
                )));
            }
        }
        Ok(HistoryRequest { symbol, range, interval })
    }
}

/// Supplies the ordered bars for a request. Implementations may hit disk or
/// the network; callers put a [`crate::data::cache::SeriesCache`] in front.
pub trait SeriesSource: Send + Sync {
    fn fetch(&self, request: &HistoryRequest) -> Result<Series, EngineError>;
}

/// Cuts `range` out of a full history. Periods are measured back from the
/// last bar; the bar exactly one period before it is excluded.
pub fn trim_to_range(series: &Series, range: HistoryRange) -> Series {
    match range {
        HistoryRange::Start(date) => match date.and_hms_opt(0, 0, 0) {
            Some(naive) => series.since(Utc.from_utc_datetime(&naive)),
            None => series.clone(),
        },
        HistoryRange::Period(period) => {
            let Some(last) = series.last().map(|b| b.timestamp) else {
                return series.clone();
            };
            match period_start(last, period) {
                PeriodStart::Exclusive(cutoff) => series.after(cutoff),
                PeriodStart::Inclusive(start) => series.since(start),
                PeriodStart::Everything => series.clone(),
            }
        }
    }
}

enum PeriodStart {
    Exclusive(DateTime<Utc>),
    Inclusive(DateTime<Utc>),
    Everything,
}

fn period_start(last: DateTime<Utc>, period: Period) -> PeriodStart {
    let months_back = |months: u32| {
        last.checked_sub_months(Months::new(months))
            .map(PeriodStart::Exclusive)
            .unwrap_or(PeriodStart::Everything)
    };
    match period {
        Period::Day1 => PeriodStart::Exclusive(last - Duration::days(1)),
        Period::Day5 => PeriodStart::Exclusive(last - Duration::days(5)),
        Period::Month1 => months_back(1),
        Period::Month3 => months_back(3),
        Period::Month6 => months_back(6),
        Period::Year1 => months_back(12),
        Period::Year2 => months_back(24),
        Period::Year5 => months_back(60),
        Period::Year10 => months_back(120),
        Period::YearToDate => match Utc.with_ymd_and_hms(last.year(), 1, 1, 0, 0, 0).single() {
            Some(start) => PeriodStart::Inclusive(start),
            None => PeriodStart::Everything,
        },
        Period::Max => PeriodStart::Everything,
    }
}

/// Sorts by timestamp and keeps the first bar of any duplicated timestamp.
fn normalize_bars(bars: &mut Vec<Bar>) {
    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
}

/// Reads `<data_dir>/<interval>/<SYMBOL>.csv`, falling back to `<data_dir>/<SYMBOL>.csv`.
pub struct CsvSeriesSource {
    data_dir: PathBuf,
    options: CsvOptions,
}

impl CsvSeriesSource {
    pub fn new(data_dir: impl Into<PathBuf>, options: CsvOptions) -> Self {
        CsvSeriesSource {
            data_dir: data_dir.into(),
            options,
        }
    }

    fn resolve_path(&self, request: &HistoryRequest) -> Option<PathBuf> {
        let file_name = format!("{}.csv", request.symbol);
        [
            self.data_dir.join(request.interval.as_str()).join(&file_name),
            self.data_dir.join(&file_name),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }
}

impl SeriesSource for CsvSeriesSource {
    fn fetch(&self, request: &HistoryRequest) -> Result<Series, EngineError> {
        let path = self.resolve_path(request).ok_or_else(|| {
            EngineError::MarketDataError(format!(
                "Data file not found for symbol '{}' ({}) under {}",
                request.symbol,
                request.interval,
                self.data_dir.display()
            ))
        })?;

        let mut bars = OhlcvCsvParser::load_bars_from_csv(&path, &self.options)
            .map_err(|e| EngineError::CsvDataFormatError(format!("{:#}", e)))?;
        normalize_bars(&mut bars);

        let series = Series::new(request.symbol.clone(), request.interval, bars)?;
        let trimmed = trim_to_range(&series, request.range);
        tracing::debug!(
            symbol = %request.symbol,
            range = %request.range,
            interval = %request.interval,
            loaded = series.len(),
            kept = trimmed.len(),
            "Fetched series from CSV"
        );
        Ok(trimmed)
    }
}

/// In-memory bars per symbol and interval, for preloaded data and tests.
pub struct MarketDataStore {
    data: HashMap<String, HashMap<Interval, Vec<Bar>>>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        MarketDataStore { data: HashMap::new() }
    }

    pub fn add_bars(&mut self, symbol: &str, interval: Interval, new_bars: Vec<Bar>) {
        let symbol_data = self.data.entry(symbol.trim().to_uppercase()).or_default();
        let interval_data = symbol_data.entry(interval).or_default();
        interval_data.extend(new_bars);
        normalize_bars(interval_data);
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.data.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesSource for MarketDataStore {
    fn fetch(&self, request: &HistoryRequest) -> Result<Series, EngineError> {
        let bars = self
            .data
            .get(&request.symbol)
            .and_then(|symbol_data| symbol_data.get(&request.interval))
            .ok_or_else(|| {
                EngineError::MarketDataError(format!(
                    "Market data not found for symbol '{}' and interval {}",
                    request.symbol, request.interval
                ))
            })?;
        let series = Series::new(request.symbol.clone(), request.interval, bars.clone())?;
        Ok(trim_to_range(&series, request.range))
    }
}
