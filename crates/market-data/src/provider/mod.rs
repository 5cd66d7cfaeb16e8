//! Market data provider trait definitions.

pub mod yahoo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::errors::MarketDataError;
use crate::models::{LatestQuotePair, Quote};

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source.
/// All symbols are provider-specific (already suffix-resolved); callers
/// resolve plain tickers through [`crate::resolver::ExchangeMap`] first.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO". Used for logging and
    /// error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote and the previous trading-day quote for a
    /// provider symbol.
    ///
    /// `previous` in the returned pair is `None` when the provider has
    /// fewer than two trading days of data for the symbol.
    async fn get_latest_quote_pair(
        &self,
        provider_symbol: &str,
        currency_hint: &str,
    ) -> Result<LatestQuotePair, MarketDataError>;

    /// Fetch historical daily quotes for a provider symbol.
    ///
    /// Quotes are returned ordered by timestamp ascending, trading days
    /// only.
    async fn get_historical_quotes(
        &self,
        provider_symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        currency_hint: &str,
    ) -> Result<Vec<Quote>, MarketDataError>;

    /// Fetch latest quote pairs for multiple symbols concurrently.
    ///
    /// Per-symbol results: one failed symbol never fails the batch.
    async fn get_latest_quote_pairs_bulk(
        &self,
        provider_symbols: &[String],
        currency_hint: &str,
    ) -> Vec<(String, Result<LatestQuotePair, MarketDataError>)> {
        let fetches = provider_symbols.iter().map(|symbol| async move {
            (
                symbol.clone(),
                self.get_latest_quote_pair(symbol, currency_hint).await,
            )
        });
        join_all(fetches).await
    }

    /// Fetch historical quotes for multiple symbols concurrently.
    ///
    /// Per-symbol results: one failed symbol never fails the batch.
    async fn get_historical_quotes_bulk(
        &self,
        provider_symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        currency_hint: &str,
    ) -> Vec<(String, Result<Vec<Quote>, MarketDataError>)> {
        let fetches = provider_symbols.iter().map(|symbol| async move {
            (
                symbol.clone(),
                self.get_historical_quotes(symbol, start, end, currency_hint)
                    .await,
            )
        });
        join_all(fetches).await
    }
}
