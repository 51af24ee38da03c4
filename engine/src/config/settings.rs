// Engine settings, loaded from a JSON file or left at their defaults
use crate::data::csv_parser::CsvOptions;
use crate::error::EngineError;
use serde::Deserialize;
use shared::indicator::{IndicatorSpec, MaKind};
use shared::models::{Interval, Period};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest time-to-live the series cache accepts (1000 years).
pub const MAX_CACHE_TTL_SECS: u64 = 1000 * 365 * 24 * 3600;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Root of the `<interval>/<SYMBOL>.csv` tree.
    pub data_dir: PathBuf,
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
    pub csv: CsvOptions,
    pub default_period: Period,
    pub default_interval: Interval,
    pub default_indicators: Vec<IndicatorSpec>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            data_dir: PathBuf::from("data"),
            cache_ttl_secs: 3600,
            cache_capacity: 64,
            csv: CsvOptions::default(),
            default_period: Period::Month3,
            default_interval: Interval::Day1,
            default_indicators: vec![
                IndicatorSpec::Sma { window: 20 },
                IndicatorSpec::Sma { window: 50 },
                IndicatorSpec::Crossover { kind: MaKind::Sma, short: 20, long: 50 },
            ],
        }
    }
}

impl EngineSettings {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::ConfigError(format!("Cannot read '{}': {}", path.display(), e)))?;
        let settings: EngineSettings = serde_json::from_str(&raw)
            .map_err(|e| EngineError::ConfigError(format!("Invalid settings in '{}': {}", path.display(), e)))?;
        settings.validate()?;
        tracing::info!(path = %path.display(), data_dir = %settings.data_dir.display(), "Loaded engine settings");
        Ok(settings)
    }

    /// Falls back to defaults only when no path is given; a given path must load.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, EngineError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                tracing::debug!("No settings file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.cache_capacity == 0 {
            return Err(EngineError::ConfigError("cache_capacity must be at least 1".to_string()));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(EngineError::ConfigError(format!(
                "cache_ttl_secs must be at most {} (1000 years)",
                MAX_CACHE_TTL_SECS
            )));
        }
        if !self.default_interval.fits_period(self.default_period) {
            return Err(EngineError::ConfigError(format!(
                "default_interval {} is not finer than default_period {}",
                self.default_interval, self.default_period
            )));
        }
        for spec in &self.default_indicators {
            spec.validate()
                .map_err(|reason| EngineError::ConfigError(format!("default indicator {}: {}", spec, reason)))?;
        }
        self.csv
            .validate()
            .map_err(|e| EngineError::ConfigError(format!("csv: {}", e)))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
