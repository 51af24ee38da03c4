use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use shared::models::Bar;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Number and date handling for OHLCV exports. Separators are configurable so
// both `1,234.56` and the Brazilian `1.234,56` layouts can be read.
pub mod number_format {
    use anyhow::{anyhow, Result};
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use std::str::FromStr;

    pub fn parse_decimal(s: &str, decimal_separator: char, thousand_separator: Option<char>) -> Result<f64> {
        let mut normalized: String = s.trim().to_string();
        if let Some(sep) = thousand_separator {
            normalized = normalized.replace(sep, ""); // Remove thousand separators
        }
        if decimal_separator != '.' {
            normalized = normalized.replace(decimal_separator, ".");
        }

        let value = f64::from_str(&normalized).map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Decimal '{}' is not a finite number", s));
        }
        Ok(value)
    }

    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` with or without a UTC offset,
    /// `YYYY-MM-DD` and `DD/MM/YYYY`. Naive values are taken as UTC.
    pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
        for format in ["%Y-%m-%d", "%d/%m/%Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                    return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
                }
            }
        }
        Err(anyhow!("Failed to parse timestamp '{}'", s))
    }

}

/// Layout of the CSV files a source reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub delimiter: char,
    pub decimal_separator: char,
    pub thousand_separator: Option<char>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: ',',
            decimal_separator: '.',
            thousand_separator: None,
        }
    }
}

impl CsvOptions {
    pub fn brazilian() -> Self {
        CsvOptions {
            delimiter: ';',
            decimal_separator: ',',
            thousand_separator: Some('.'),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(anyhow!("CSV delimiter '{}' must be a single ASCII character", self.delimiter));
        }
        if Some(self.decimal_separator) == self.thousand_separator {
            return Err(anyhow!("Decimal and thousand separators must differ"));
        }
        if self.delimiter == self.decimal_separator {
            return Err(anyhow!("CSV delimiter and decimal separator must differ"));
        }
        Ok(())
    }
}

pub struct OhlcvCsvParser;

impl OhlcvCsvParser {
    // CSV Header: Date,Open,High,Low,Close,Volume (any order, case-insensitive)
    // Example Row: 2024-01-02,187.15,188.44,183.89,185.64,82488700
    // Only Date and Close are required; missing or empty Open/High/Low/Volume become None.
    pub fn load_bars_from_csv(file_path: &Path, options: &CsvOptions) -> Result<Vec<Bar>> {
        let file = File::open(file_path).with_context(|| format!("Failed to open CSV file '{}'", file_path.display()))?;
        let bars = Self::parse_bars(BufReader::new(file), options)
            .with_context(|| format!("Failed to read bars from '{}'", file_path.display()))?;
        tracing::debug!(path = %file_path.display(), count = bars.len(), "Loaded bars from CSV");
        Ok(bars)
    }

    pub fn parse_bars<R: Read>(reader: R, options: &CsvOptions) -> Result<Vec<Bar>> {
        options.validate()?;
        let mut rdr = ReaderBuilder::new()
            .delimiter(options.delimiter as u8)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let date_idx = Self::column_index(&headers, &["Date", "Datetime", "Timestamp"])
            .ok_or_else(|| anyhow!("Missing 'Date' column in CSV header"))?;
        let close_idx = Self::column_index(&headers, &["Close"]).ok_or_else(|| anyhow!("Missing 'Close' column in CSV header"))?;
        let open_idx = Self::column_index(&headers, &["Open"]);
        let high_idx = Self::column_index(&headers, &["High"]);
        let low_idx = Self::column_index(&headers, &["Low"]);
        let volume_idx = Self::column_index(&headers, &["Volume"]);

        let mut bars = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result.map_err(|e| anyhow!("Error reading CSV record at line {}: {}", line, e))?;

            let date_str = Self::get_field(&record, Some(date_idx))
                .ok_or_else(|| anyhow!("Missing 'Date' field in CSV record at line {}", line))?;
            let timestamp = number_format::parse_datetime(date_str)
                .map_err(|e| anyhow!("Error parsing 'Date' at line {}: {}", line, e))?;

            let close_str = Self::get_field(&record, Some(close_idx))
                .ok_or_else(|| anyhow!("Missing 'Close' field in CSV record at line {}", line))?;
            let close = Self::parse_price(close_str, "Close", line, options)?;

            let open = Self::optional_price(&record, open_idx, "Open", line, options)?;
            let high = Self::optional_price(&record, high_idx, "High", line, options)?;
            let low = Self::optional_price(&record, low_idx, "Low", line, options)?;

            let volume = match Self::get_field(&record, volume_idx) {
                None => None,
                Some(raw) => {
                    let value = number_format::parse_decimal(raw, options.decimal_separator, options.thousand_separator)
                        .map_err(|e| anyhow!("Error parsing 'Volume' at line {}: {}", line, e))?;
                    if value < 0.0 {
                        return Err(anyhow!("Negative 'Volume' at line {}: {}", line, raw));
                    }
                    Some(value.round() as u64)
                }
            };

            bars.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }
        Ok(bars)
    }

    fn parse_price(raw: &str, name: &str, line: usize, options: &CsvOptions) -> Result<f64> {
        number_format::parse_decimal(raw, options.decimal_separator, options.thousand_separator)
            .map_err(|e| anyhow!("Error parsing '{}' at line {}: {}", name, line, e))
    }

    fn optional_price(record: &StringRecord, idx: Option<usize>, name: &str, line: usize, options: &CsvOptions) -> Result<Option<f64>> {
        Self::get_field(record, idx)
            .map(|raw| Self::parse_price(raw, name, line, options))
            .transpose()
    }

    // Header lookup by name, ignoring case; the first alias present wins.
    fn column_index(headers: &StringRecord, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| headers.iter().position(|header| header.eq_ignore_ascii_case(name)))
    }

    // Empty cells count as absent.
    fn get_field<'a>(record: &'a StringRecord, idx: Option<usize>) -> Option<&'a str> {
        idx.and_then(|i| record.get(i)).filter(|value| !value.is_empty())
    }
}
