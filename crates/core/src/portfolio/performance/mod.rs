pub mod performance_model;
pub mod performance_service;

#[cfg(test)]
mod performance_service_tests;

pub use performance_model::{
    AlignedReturns, BenchmarkMetrics, HoldingPeriodReturn, PerformanceMetrics, PerformanceReport,
    ReportPeriod, ReturnData, ValuePoint,
};
pub use performance_service::PerformanceService;
