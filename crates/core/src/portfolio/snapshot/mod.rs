pub mod snapshot_model;
pub mod snapshot_service;

pub use snapshot_model::{HoldingsStatistics, PortfolioSnapshot};
pub use snapshot_service::{snapshot, statistics, top_n_concentration};
