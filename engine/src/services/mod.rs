// Request-driven views over the engine: fetch, compute, aggregate.
pub mod dashboard_service;

pub use dashboard_service::{
    ComparisonRequest, ComparisonView, DashboardService, SecurityRequest, SecurityView, SymbolFailure,
};
