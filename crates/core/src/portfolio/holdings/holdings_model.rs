use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An input position: one row of the holdings table, one per distinct
/// instrument. Immutable once loaded; every metrics pass recomputes the
/// derived view from scratch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub asset_name: String,
    /// Plain ticker, without venue suffix. Join key to price data.
    pub symbol: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    /// Pre-existing current-price column from the input table, used as a
    /// last-resort fallback when no live price is fetched.
    pub fallback_price: Option<Decimal>,
}

/// Which source produced the current price of a [`PricedHolding`].
///
/// The fallback chain is ordered: a fetched quote wins, then the imported
/// current-price column, then the average cost (which values the position
/// at cost basis, i.e. zero gain).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PriceSource {
    Fetched,
    ImportedColumn,
    AverageCost,
}

/// A holding enriched with prices and the derived valuation block.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PricedHolding {
    pub id: String,
    pub asset_name: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub average_price: Decimal,

    pub current_price: Decimal,
    pub price_source: PriceSource,
    pub previous_close: Option<Decimal>,

    /// quantity x average_price
    pub invested: Decimal,
    /// quantity x current_price
    pub current_value: Decimal,
    /// current_value - invested
    pub gain: Decimal,
    /// gain / invested x 100, 0 when invested is 0
    pub gain_pct: Decimal,
    /// (current_price - previous_close) x quantity, 0 without previous close
    pub today_change: Decimal,
    /// Day change percent, 0 without previous close
    pub today_pct: Decimal,
    /// current_value / total portfolio value x 100, 0 when the total is 0
    pub weight: Decimal,
    /// gain_pct x weight / 100
    pub weighted_return: Decimal,

    /// Trading date of the latest fetched quote; absent without one.
    pub as_of_date: Option<NaiveDate>,
}

/// Result of valuing a holdings set: the enriched table plus the symbols
/// whose price had to fall back (surfaced to the caller as a warning).
#[derive(Debug, Clone)]
pub struct ValuationOutcome {
    pub holdings: Vec<PricedHolding>,
    pub missing_price_symbols: Vec<String>,
}
