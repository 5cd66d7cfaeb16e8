//! Nivesh Market Data Crate
//!
//! This crate provides provider-agnostic market data fetching for the
//! Nivesh portfolio analytics engine.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Latest and previous-close quote pairs for day-change calculations
//! - Historical daily close series over a date range
//! - Exchange-suffix symbol resolution (e.g., "NIFTYBEES" -> "NIFTYBEES.NS")
//! - TTL-bounded response caching to avoid redundant provider calls
//!
//! # Core Types
//!
//! - [`Quote`] - Market data quote with OHLCV data
//! - [`LatestQuotePair`] - Latest quote plus the previous trading-day quote
//! - [`MarketDataProvider`] - Trait implemented by data sources
//! - [`QuoteCache`] - TTL cache keyed by request shape
//!
//! Any subset of requested symbols may be absent from a provider response;
//! partial results are the normal case, not an error.

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;

pub use cache::QuoteCache;
pub use errors::{MarketDataError, RetryClass};
pub use models::{LatestQuotePair, Quote};
pub use provider::yahoo::YahooProvider;
pub use provider::MarketDataProvider;
pub use resolver::{ExchangeMap, ExchangeSuffix, DEFAULT_EXCHANGE, EXCHANGE_MAP};
