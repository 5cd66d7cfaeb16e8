use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::{debug, warn};

use nivesh_market_data::{MarketDataProvider, Quote, QuoteCache, DEFAULT_EXCHANGE, EXCHANGE_MAP};

use crate::errors::Result;

use super::market_data_model::{CloseSeriesSet, PricePoint, QuotePairs};
use super::market_data_traits::MarketDataServiceTrait;

/// Price data service over a provider, with exchange-suffix resolution and
/// TTL caching.
///
/// Per-ticker provider failures are logged and reported in the `missing`
/// list of the result; they never fail the batch.
pub struct MarketDataService {
    provider: Arc<dyn MarketDataProvider>,
    cache: QuoteCache,
    exchange: String,
}

impl MarketDataService {
    /// Create a service with the default exchange (NSE) and default cache
    /// TTLs.
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_config(provider, DEFAULT_EXCHANGE, QuoteCache::new())
    }

    /// Create a service for a specific exchange with a caller-configured
    /// cache.
    pub fn with_config(
        provider: Arc<dyn MarketDataProvider>,
        exchange: &str,
        cache: QuoteCache,
    ) -> Self {
        Self {
            provider,
            cache,
            exchange: exchange.to_string(),
        }
    }

    /// Map a plain ticker to the provider-specific symbol.
    ///
    /// Index symbols (leading '^') and symbols that already carry a venue
    /// suffix pass through unchanged.
    fn provider_symbol(&self, ticker: &str) -> String {
        if ticker.starts_with('^') || ticker.contains('.') {
            return ticker.to_string();
        }
        EXCHANGE_MAP.provider_symbol(ticker, &self.exchange)
    }

    fn currency_hint(&self) -> &str {
        EXCHANGE_MAP.currency(&self.exchange)
    }

    fn cache_key(symbols: &[String], window: &str) -> String {
        let mut sorted: Vec<&str> = symbols.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        format!("{}|{}", sorted.join(","), window)
    }

    fn day_bounds(start_date: NaiveDate, end_date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.from_utc_datetime(&start_date.and_hms_opt(0, 0, 0).unwrap_or_default());
        let end = Utc.from_utc_datetime(&end_date.and_hms_opt(23, 59, 59).unwrap_or_default());
        (start, end)
    }

    /// Collapse raw quotes into an ascending daily close series. Multiple
    /// quotes on one date keep the latest.
    fn quotes_to_price_points(quotes: &[Quote]) -> Vec<PricePoint> {
        let mut points: Vec<PricePoint> = Vec::with_capacity(quotes.len());
        for quote in quotes {
            let date = quote.timestamp.date_naive();
            match points.last_mut() {
                Some(last) if last.date == date => last.close = quote.close,
                _ => points.push(PricePoint {
                    date,
                    close: quote.close,
                }),
            }
        }
        points
    }

    fn missing_from<T>(symbols: &[String], present: &HashMap<String, T>) -> Vec<String> {
        symbols
            .iter()
            .filter(|s| !present.contains_key(*s))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    async fn get_latest_quote_pairs(&self, symbols: &[String]) -> Result<QuotePairs> {
        if symbols.is_empty() {
            return Ok(QuotePairs::default());
        }

        let key = Self::cache_key(symbols, "latest-pair");
        if let Some(pairs) = self.cache.get_pairs(&key).await {
            debug!("Latest quote pairs served from cache for {} symbols", symbols.len());
            let missing = Self::missing_from(symbols, &pairs);
            return Ok(QuotePairs { pairs, missing });
        }

        let mapped: Vec<(String, String)> = symbols
            .iter()
            .map(|ticker| (ticker.clone(), self.provider_symbol(ticker)))
            .collect();
        let provider_symbols: Vec<String> = mapped.iter().map(|(_, p)| p.clone()).collect();

        let results = self
            .provider
            .get_latest_quote_pairs_bulk(&provider_symbols, self.currency_hint())
            .await;

        let mut pairs = HashMap::with_capacity(symbols.len());
        let mut missing = Vec::new();
        for ((ticker, _), (provider_symbol, result)) in mapped.iter().zip(results) {
            match result {
                Ok(pair) => {
                    pairs.insert(ticker.clone(), pair);
                }
                Err(e) => {
                    warn!(
                        "No latest quote for {} ({}): {}. Degrading to fallback pricing.",
                        ticker, provider_symbol, e
                    );
                    missing.push(ticker.clone());
                }
            }
        }

        self.cache.set_pairs(key, pairs.clone()).await;

        Ok(QuotePairs { pairs, missing })
    }

    async fn get_daily_close_series(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<CloseSeriesSet> {
        if symbols.is_empty() {
            return Ok(CloseSeriesSet::default());
        }

        let window = format!("{}..{}", start_date, end_date);
        let key = Self::cache_key(symbols, &window);
        if let Some(quotes_by_ticker) = self.cache.get_history(&key).await {
            debug!(
                "Historical series served from cache for {} symbols ({})",
                symbols.len(),
                window
            );
            let missing = Self::missing_from(symbols, &quotes_by_ticker);
            let series = quotes_by_ticker
                .iter()
                .map(|(ticker, quotes)| (ticker.clone(), Self::quotes_to_price_points(quotes)))
                .collect();
            return Ok(CloseSeriesSet { series, missing });
        }

        let mapped: Vec<(String, String)> = symbols
            .iter()
            .map(|ticker| (ticker.clone(), self.provider_symbol(ticker)))
            .collect();
        let provider_symbols: Vec<String> = mapped.iter().map(|(_, p)| p.clone()).collect();

        let (start, end) = Self::day_bounds(start_date, end_date);
        let results = self
            .provider
            .get_historical_quotes_bulk(&provider_symbols, start, end, self.currency_hint())
            .await;

        let mut quotes_by_ticker: HashMap<String, Vec<Quote>> =
            HashMap::with_capacity(symbols.len());
        let mut missing = Vec::new();
        for ((ticker, _), (provider_symbol, result)) in mapped.iter().zip(results) {
            match result {
                Ok(quotes) => {
                    quotes_by_ticker.insert(ticker.clone(), quotes);
                }
                Err(e) => {
                    warn!(
                        "No history for {} ({}) in {}: {}",
                        ticker, provider_symbol, window, e
                    );
                    missing.push(ticker.clone());
                }
            }
        }

        self.cache
            .set_history(key, quotes_by_ticker.clone())
            .await;

        let series = quotes_by_ticker
            .iter()
            .map(|(ticker, quotes)| (ticker.clone(), Self::quotes_to_price_points(quotes)))
            .collect();

        Ok(CloseSeriesSet { series, missing })
    }

    async fn refresh(&self) {
        debug!("Clearing market data cache");
        self.cache.clear_all().await;
    }
}
