// Engine library root

pub mod aggregation;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod services;

pub use error::{EngineError, IndicatorError};
