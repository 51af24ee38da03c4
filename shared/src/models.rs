use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One OHLCV sample. Only `close` is mandatory: FX and index exports often ship
/// without volume, and some close-only files carry no open/high/low either.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: Option<u64>) -> Self {
        Bar {
            timestamp,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close,
            volume,
        }
    }

    pub fn close_only(timestamp: DateTime<Utc>, close: f64) -> Self {
        Bar {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index} at {timestamp} is not strictly after the previous bar")]
    NonIncreasingTimestamp { index: usize, timestamp: DateTime<Utc> },

    #[error("bar {index} has an invalid {column} ({value}); prices must be finite and positive")]
    InvalidPrice { index: usize, column: &'static str, value: f64 },
}

/// Ordered bars for one symbol. Construction enforces strictly increasing
/// timestamps, so every derived column can be aligned by position alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: String,
    interval: Interval,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, interval: Interval, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            let prices = [
                ("Open", bar.open),
                ("High", bar.high),
                ("Low", bar.low),
                ("Close", Some(bar.close)),
            ];
            for (column, value) in prices {
                if let Some(value) = value.filter(|v| !(v.is_finite() && *v > 0.0)) {
                    return Err(SeriesError::InvalidPrice { index, column, value });
                }
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(SeriesError::NonIncreasingTimestamp { index, timestamp: bar.timestamp });
            }
        }
        Ok(Series {
            symbol: symbol.into(),
            interval,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Keeps only the bars at or after `start`. Ordering is preserved, so the
    /// result is still a valid series.
    pub fn since(&self, start: DateTime<Utc>) -> Series {
        self.filtered(|b| b.timestamp >= start)
    }

    /// Keeps only the bars strictly after `cutoff`.
    pub fn after(&self, cutoff: DateTime<Utc>) -> Series {
        self.filtered(|b| b.timestamp > cutoff)
    }

    fn filtered(&self, keep: impl Fn(&Bar) -> bool) -> Series {
        Series {
            symbol: self.symbol.clone(),
            interval: self.interval,
            bars: self.bars.iter().filter(|b| keep(b)).copied().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTokenError {
    #[error("unknown interval '{0}'")]
    Interval(String),

    #[error("unknown period '{0}'")]
    Period(String),

    #[error("invalid indicator '{token}': {reason}")]
    Indicator { token: String, reason: String },
}

/// Bar spacing, ordered from finest to coarsest. The order matters: it is the
/// order the period/interval compatibility rule is evaluated in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "2m")]
    Minute2,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "60m")]
    Minute60,
    #[serde(rename = "90m")]
    Minute90,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "5d")]
    Day5,
    #[serde(rename = "1wk")]
    Week1,
    #[serde(rename = "1mo")]
    Month1,
    #[serde(rename = "3mo")]
    Month3,
}

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::Minute1,
        Interval::Minute2,
        Interval::Minute5,
        Interval::Minute15,
        Interval::Minute30,
        Interval::Minute60,
        Interval::Minute90,
        Interval::Hour1,
        Interval::Day1,
        Interval::Day5,
        Interval::Week1,
        Interval::Month1,
        Interval::Month3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute2 => "2m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Minute60 => "60m",
            Interval::Minute90 => "90m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
            Interval::Day5 => "5d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
            Interval::Month3 => "3mo",
        }
    }

    /// When the period token is itself an interval (`1d`, `5d`, `1mo`, `3mo`)
    /// only strictly finer intervals make sense; every other period accepts any interval.
    pub fn fits_period(&self, period: Period) -> bool {
        match period.as_interval() {
            Some(limit) => *self < limit,
            None => true,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Interval::ALL
            .iter()
            .copied()
            .find(|i| i.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| ParseTokenError::Interval(s.to_string()))
    }
}

/// How far back from the most recent bar a history request reaches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Period {
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "5d")]
    Day5,
    #[serde(rename = "1mo")]
    Month1,
    #[serde(rename = "3mo")]
    Month3,
    #[serde(rename = "6mo")]
    Month6,
    #[serde(rename = "1y")]
    Year1,
    #[serde(rename = "2y")]
    Year2,
    #[serde(rename = "5y")]
    Year5,
    #[serde(rename = "10y")]
    Year10,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::Day1,
        Period::Day5,
        Period::Month1,
        Period::Month3,
        Period::Month6,
        Period::Year1,
        Period::Year2,
        Period::Year5,
        Period::Year10,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day1 => "1d",
            Period::Day5 => "5d",
            Period::Month1 => "1mo",
            Period::Month3 => "3mo",
            Period::Month6 => "6mo",
            Period::Year1 => "1y",
            Period::Year2 => "2y",
            Period::Year5 => "5y",
            Period::Year10 => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// The interval sharing this period's token, if any.
    pub fn as_interval(&self) -> Option<Interval> {
        match self {
            Period::Day1 => Some(Interval::Day1),
            Period::Day5 => Some(Interval::Day5),
            Period::Month1 => Some(Interval::Month1),
            Period::Month3 => Some(Interval::Month3),
            _ => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Period::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| ParseTokenError::Period(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    #[test]
    fn test_series_rejects_duplicate_timestamps() {
        let bars = vec![Bar::close_only(ts(0), 1.0), Bar::close_only(ts(0), 2.0)];
        let err = Series::new("AAPL", Interval::Day1, bars).unwrap_err();
        assert_eq!(err, SeriesError::NonIncreasingTimestamp { index: 1, timestamp: ts(0) });
    }

    #[test]
    fn test_series_rejects_non_positive_close() {
        let bars = vec![Bar::close_only(ts(0), 1.0), Bar::close_only(ts(1), 0.0)];
        assert!(matches!(
            Series::new("AAPL", Interval::Day1, bars),
            Err(SeriesError::InvalidPrice { index: 1, column: "Close", .. })
        ));
    }

    #[test]
    fn test_series_rejects_non_finite_prices() {
        let infinite_close = vec![Bar::close_only(ts(0), f64::INFINITY)];
        assert!(matches!(
            Series::new("AAPL", Interval::Day1, infinite_close),
            Err(SeriesError::InvalidPrice { index: 0, column: "Close", .. })
        ));

        let nan_high = vec![
            Bar::new(ts(0), 10.0, 11.0, 9.0, 10.5, None),
            Bar::new(ts(1), 10.5, f64::NAN, 10.0, 10.2, None),
        ];
        assert!(matches!(
            Series::new("AAPL", Interval::Day1, nan_high),
            Err(SeriesError::InvalidPrice { index: 1, column: "High", .. })
        ));

        let negative_low = vec![Bar::new(ts(0), 10.0, 11.0, -1.0, 10.5, None)];
        assert!(matches!(
            Series::new("AAPL", Interval::Day1, negative_low),
            Err(SeriesError::InvalidPrice { index: 0, column: "Low", .. })
        ));
    }

    #[test]
    fn test_series_accepts_missing_optional_prices() {
        let bars = vec![Bar::close_only(ts(0), 1.0815), Bar::new(ts(1), 1.08, 1.09, 1.07, 1.0822, None)];
        assert_eq!(Series::new("EURUSD=X", Interval::Day1, bars).unwrap().len(), 2);
    }

    #[test]
    fn test_series_allows_gaps_and_empty() {
        let bars = vec![Bar::close_only(ts(0), 1.0), Bar::close_only(ts(7), 2.0)];
        assert_eq!(Series::new("AAPL", Interval::Day1, bars).unwrap().len(), 2);
        assert!(Series::new("AAPL", Interval::Day1, Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_series_since_trims_leading_bars() {
        let bars = (0..5).map(|d| Bar::close_only(ts(d), 10.0 + d as f64)).collect();
        let series = Series::new("MSFT", Interval::Day1, bars).unwrap();
        let trimmed = series.since(ts(3));
        assert_eq!(trimmed.closes(), vec![13.0, 14.0]);
        assert_eq!(trimmed.symbol(), "MSFT");
        assert_eq!(series.after(ts(3)).closes(), vec![14.0]);
    }

    #[test]
    fn test_interval_tokens() {
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Week1);
        assert_eq!("60M".parse::<Interval>().unwrap(), Interval::Minute60);
        assert_eq!(Interval::Month3.to_string(), "3mo");
        assert!("2wk".parse::<Interval>().is_err());
    }

    #[test]
    fn test_period_tokens() {
        assert_eq!("ytd".parse::<Period>().unwrap(), Period::YearToDate);
        assert_eq!(Period::Year10.to_string(), "10y");
        assert_eq!("4y".parse::<Period>(), Err(ParseTokenError::Period("4y".to_string())));
    }

    #[test]
    fn test_interval_must_be_finer_than_matching_period() {
        assert!(Interval::Minute5.fits_period(Period::Day1));
        assert!(!Interval::Day1.fits_period(Period::Day1));
        assert!(!Interval::Week1.fits_period(Period::Day5));
        assert!(Interval::Week1.fits_period(Period::Month1));
        assert!(Interval::Month3.fits_period(Period::Max));
    }

    #[test]
    fn test_interval_serde_uses_tokens() {
        assert_eq!(serde_json::to_string(&Interval::Hour1).unwrap(), "\"1h\"");
        let p: Period = serde_json::from_str("\"6mo\"").unwrap();
        assert_eq!(p, Period::Month6);
    }
}
