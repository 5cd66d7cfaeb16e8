use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;

use super::market_data_model::{CloseSeriesSet, QuotePairs};

/// Price data boundary used by the valuation and performance services.
///
/// Implementations are best-effort: any subset of the requested tickers
/// may come back missing, and that is reported in the result rather than
/// raised as an error.
#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    /// Latest close and previous trading-day close for each ticker.
    async fn get_latest_quote_pairs(&self, symbols: &[String]) -> Result<QuotePairs>;

    /// Historical daily close series for each ticker over
    /// [start_date, end_date], ordered by date ascending.
    async fn get_daily_close_series(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<CloseSeriesSet>;

    /// Invalidate every cached provider response. The next call re-fetches.
    async fn refresh(&self);
}
