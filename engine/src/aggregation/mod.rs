// Multi-symbol comparison views built on top of individual series.
pub mod multi_series;
pub mod pct_change;
pub mod performance;

pub use multi_series::{MultiSeriesFrame, MultiSeriesRow};
pub use pct_change::pct_change_from_first;
pub use performance::{performance_table, sub_period_performance, PerformanceTable, PerformanceWindow, SubPeriodPerformance};
