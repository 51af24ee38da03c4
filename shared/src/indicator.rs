use crate::models::{Bar, Interval, ParseTokenError, Series};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Moving-average family a crossover compares.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MaKind {
    #[serde(rename = "SMA")]
    Sma,
    #[serde(rename = "EMA")]
    Ema,
}

impl MaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaKind::Sma => "SMA",
            MaKind::Ema => "EMA",
        }
    }

    /// Column name of this kind's moving average for `window`, e.g. `SMA_20`.
    pub fn column_name(&self, window: usize) -> String {
        format!("{}_{}", self.as_str(), window)
    }
}

impl fmt::Display for MaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaKind {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMA" => Ok(MaKind::Sma),
            "EMA" => Ok(MaKind::Ema),
            _ => Err(ParseTokenError::Indicator {
                token: s.to_string(),
                reason: "expected SMA or EMA".to_string(),
            }),
        }
    }
}

/// A requested indicator. The textual form (`SMA_20`, `EMA_50`, `ATR`, `MACD`,
/// `RSI`, `Crossover_SMA_20/50`) doubles as the name of the column it produces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum IndicatorSpec {
    Sma { window: usize },
    Ema { span: usize },
    Atr,
    Macd,
    Rsi,
    Crossover { kind: MaKind, short: usize, long: usize },
}

impl IndicatorSpec {
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            IndicatorSpec::Sma { window: 0 } => Err("SMA window must be at least 1".to_string()),
            IndicatorSpec::Ema { span: 0 } => Err("EMA span must be at least 1".to_string()),
            IndicatorSpec::Crossover { short, long, .. } if short == 0 || long == 0 => {
                Err("crossover windows must be at least 1".to_string())
            }
            IndicatorSpec::Crossover { short, long, .. } if short == long => {
                Err("crossover windows must differ".to_string())
            }
            _ => Ok(()),
        }
    }

    pub fn is_crossover(&self) -> bool {
        matches!(self, IndicatorSpec::Crossover { .. })
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorSpec::Sma { window } => write!(f, "SMA_{}", window),
            IndicatorSpec::Ema { span } => write!(f, "EMA_{}", span),
            IndicatorSpec::Atr => f.write_str("ATR"),
            IndicatorSpec::Macd => f.write_str("MACD"),
            IndicatorSpec::Rsi => f.write_str("RSI"),
            IndicatorSpec::Crossover { kind, short, long } => write!(f, "Crossover_{}_{}/{}", kind, short, long),
        }
    }
}

fn parse_window(token: &str, raw: &str) -> Result<usize, ParseTokenError> {
    raw.trim().parse::<usize>().map_err(|e| ParseTokenError::Indicator {
        token: token.to_string(),
        reason: format!("bad window '{}': {}", raw, e),
    })
}

impl FromStr for IndicatorSpec {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let upper = token.to_ascii_uppercase();

        let spec = match upper.as_str() {
            "ATR" => IndicatorSpec::Atr,
            "MACD" => IndicatorSpec::Macd,
            "RSI" => IndicatorSpec::Rsi,
            _ => {
                if let Some(rest) = upper.strip_prefix("CROSSOVER_") {
                    let (kind, windows) = rest.split_once('_').ok_or_else(|| ParseTokenError::Indicator {
                        token: token.to_string(),
                        reason: "expected Crossover_<KIND>_<short>/<long>".to_string(),
                    })?;
                    let (short, long) = windows.split_once('/').ok_or_else(|| ParseTokenError::Indicator {
                        token: token.to_string(),
                        reason: "expected <short>/<long> windows".to_string(),
                    })?;
                    IndicatorSpec::Crossover {
                        kind: kind.parse()?,
                        short: parse_window(token, short)?,
                        long: parse_window(token, long)?,
                    }
                } else if let Some((kind, window)) = upper.split_once('_') {
                    let window = parse_window(token, window)?;
                    match kind.parse::<MaKind>()? {
                        MaKind::Sma => IndicatorSpec::Sma { window },
                        MaKind::Ema => IndicatorSpec::Ema { span: window },
                    }
                } else {
                    return Err(ParseTokenError::Indicator {
                        token: token.to_string(),
                        reason: "unknown indicator".to_string(),
                    });
                }
            }
        };

        spec.validate().map_err(|reason| ParseTokenError::Indicator {
            token: token.to_string(),
            reason,
        })?;
        Ok(spec)
    }
}

impl TryFrom<String> for IndicatorSpec {
    type Error = ParseTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IndicatorSpec> for String {
    fn from(spec: IndicatorSpec) -> Self {
        spec.to_string()
    }
}

/// A derived numeric column, aligned index-for-index with its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorColumn {
    pub name: String,
    pub parameters: serde_json::Value,
    pub values: Vec<f64>,
}

/// A `{-1, 0, +1}` column marking bearish and bullish moving-average crosses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverSignal {
    pub name: String,
    pub kind: MaKind,
    pub short: usize,
    pub long: usize,
    pub values: Vec<i8>,
}

impl CrossoverSignal {
    /// Indices of golden crosses.
    pub fn bullish_indices(&self) -> Vec<usize> {
        self.values.iter().enumerate().filter(|(_, v)| **v > 0).map(|(i, _)| i).collect()
    }

    /// Indices of death crosses.
    pub fn bearish_indices(&self) -> Vec<usize> {
        self.values.iter().enumerate().filter(|(_, v)| **v < 0).map(|(i, _)| i).collect()
    }
}

/// The bars of one series plus whatever columns were requested for it.
/// Unrequested indicators have no column at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub interval: Interval,
    pub bars: Vec<Bar>,
    pub columns: Vec<IndicatorColumn>,
    pub signals: Vec<CrossoverSignal>,
}

impl IndicatorFrame {
    pub fn from_series(series: &Series) -> Self {
        IndicatorFrame {
            symbol: series.symbol().to_string(),
            interval: series.interval(),
            bars: series.bars().to_vec(),
            columns: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&IndicatorColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn signal(&self, name: &str) -> Option<&CrossoverSignal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Adds a column, replacing any earlier column of the same name so a
    /// duplicated request does not produce two identical columns.
    pub fn push_column(&mut self, column: IndicatorColumn) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    pub fn push_signal(&mut self, signal: CrossoverSignal) {
        match self.signals.iter_mut().find(|s| s.name == signal.name) {
            Some(existing) => *existing = signal,
            None => self.signals.push(signal),
        }
    }
}
