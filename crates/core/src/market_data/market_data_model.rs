//! Market data domain models used by the engine.

use chrono::NaiveDate;
use nivesh_market_data::LatestQuotePair;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One daily close, keyed by trading date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Latest/previous-close pairs for a set of tickers, plus the tickers the
/// provider could not serve. A non-empty `missing` list is a degraded
/// result, not a failure.
#[derive(Debug, Clone, Default)]
pub struct QuotePairs {
    pub pairs: HashMap<String, LatestQuotePair>,
    pub missing: Vec<String>,
}

/// Historical close series for a set of tickers, ordered by date
/// ascending, plus the tickers the provider could not serve.
#[derive(Debug, Clone, Default)]
pub struct CloseSeriesSet {
    pub series: HashMap<String, Vec<PricePoint>>,
    pub missing: Vec<String>,
}
