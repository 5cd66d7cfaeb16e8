//! Nivesh Core - Portfolio analytics engine.
//!
//! This crate contains the core analytics for Nivesh: holdings ingestion,
//! live valuation against fetched prices, portfolio aggregation,
//! concentration analysis, and time-series performance statistics.
//! It is presentation-agnostic: everything it produces is plain data for
//! a UI or export layer to render.

pub mod constants;
pub mod errors;
pub mod exports;
pub mod imports;
pub mod market_data;
pub mod portfolio;
pub mod utils;

// Re-export common types from the portfolio modules
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
