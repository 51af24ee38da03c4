pub mod indicator;
pub mod models;
pub mod utils;

// Shared models for the dashboard engine and any front end that consumes its frames.
pub use indicator::{CrossoverSignal, IndicatorColumn, IndicatorFrame, IndicatorSpec, MaKind};
pub use models::{Bar, Interval, ParseTokenError, Period, Series, SeriesError};
