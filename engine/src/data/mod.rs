pub mod cache;
pub mod csv_parser;
pub mod market_data;

pub use cache::SeriesCache;
pub use csv_parser::{CsvOptions, OhlcvCsvParser};
pub use market_data::{trim_to_range, CsvSeriesSource, HistoryRange, HistoryRequest, MarketDataStore, SeriesSource};
