//! Yahoo Finance market data provider.
//!
//! This provider uses the Yahoo Finance API to fetch market data for
//! equities and ETFs (e.g., NIFTYBEES.NS, AAPL) and index benchmarks
//! (e.g., ^NSEI).

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::warn;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{LatestQuotePair, Quote};
use crate::provider::MarketDataProvider;

const PROVIDER_ID: &str = "YAHOO";

/// Range passed to Yahoo for latest/previous-close pairs. Five calendar
/// days always span at least two trading days across weekends and
/// exchange holidays.
const LATEST_PAIR_RANGE: &str = "5d";

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub async fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Convert chrono DateTime<Utc> to time::OffsetDateTime for the Yahoo API.
    fn chrono_to_offset_datetime(dt: DateTime<Utc>) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(dt.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    /// Convert a Yahoo quote to our Quote model.
    ///
    /// A NaN or non-finite close is a validation failure for that quote;
    /// the open/high/low/volume fields degrade to `None` individually.
    fn yahoo_quote_to_quote(
        &self,
        yahoo_quote: &yahoo::Quote,
        currency: &str,
    ) -> Result<Quote, MarketDataError> {
        let timestamp: DateTime<Utc> = Utc
            .timestamp_opt(yahoo_quote.timestamp as i64, 0)
            .single()
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("Invalid timestamp: {}", yahoo_quote.timestamp),
            })?;

        // Close price is required
        let close = Decimal::from_f64_retain(yahoo_quote.close)
            .filter(|_| yahoo_quote.close.is_finite())
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!(
                    "Failed to convert close price {} to Decimal",
                    yahoo_quote.close
                ),
            })?;

        Ok(Quote {
            timestamp,
            open: finite_decimal(yahoo_quote.open),
            high: finite_decimal(yahoo_quote.high),
            low: finite_decimal(yahoo_quote.low),
            close,
            volume: Decimal::from_u64(yahoo_quote.volume),
            currency: currency.to_string(),
            source: PROVIDER_ID.to_string(),
        })
    }

    /// Convert raw Yahoo quotes, dropping individual quotes that fail
    /// validation. The batch survives a bad data point.
    fn convert_quotes(
        &self,
        provider_symbol: &str,
        yahoo_quotes: &[yahoo::Quote],
        currency: &str,
    ) -> Vec<Quote> {
        let mut quotes: Vec<Quote> = yahoo_quotes
            .iter()
            .filter_map(
                |yahoo_quote| match self.yahoo_quote_to_quote(yahoo_quote, currency) {
                    Ok(quote) => Some(quote),
                    Err(e) => {
                        warn!("Skipping invalid quote for {}: {}", provider_symbol, e);
                        None
                    }
                },
            )
            .collect();
        quotes.sort_by_key(|q| q.timestamp);
        quotes
    }
}

fn finite_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64_retain(value)
    } else {
        None
    }
}

fn map_yahoo_error(provider_symbol: &str, error: yahoo::YahooError) -> MarketDataError {
    match error {
        yahoo::YahooError::FetchFailed(message) => MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message,
        },
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
            MarketDataError::SymbolNotFound(provider_symbol.to_string())
        }
        other => MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote_pair(
        &self,
        provider_symbol: &str,
        currency_hint: &str,
    ) -> Result<LatestQuotePair, MarketDataError> {
        let response = self
            .connector
            .get_quote_range(provider_symbol, "1d", LATEST_PAIR_RANGE)
            .await
            .map_err(|e| map_yahoo_error(provider_symbol, e))?;

        let yahoo_quotes = response
            .quotes()
            .map_err(|e| map_yahoo_error(provider_symbol, e))?;

        let mut quotes = self.convert_quotes(provider_symbol, &yahoo_quotes, currency_hint);

        let latest = quotes
            .pop()
            .ok_or_else(|| MarketDataError::SymbolNotFound(provider_symbol.to_string()))?;
        let previous = quotes.pop();

        Ok(LatestQuotePair { latest, previous })
    }

    async fn get_historical_quotes(
        &self,
        provider_symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        currency_hint: &str,
    ) -> Result<Vec<Quote>, MarketDataError> {
        let start_offset = Self::chrono_to_offset_datetime(start);
        let end_offset = Self::chrono_to_offset_datetime(end);

        let response = self
            .connector
            .get_quote_history(provider_symbol, start_offset, end_offset)
            .await
            .map_err(|e| map_yahoo_error(provider_symbol, e))?;

        let yahoo_quotes = response
            .quotes()
            .map_err(|e| map_yahoo_error(provider_symbol, e))?;

        let quotes = self.convert_quotes(provider_symbol, &yahoo_quotes, currency_hint);

        if quotes.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        Ok(quotes)
    }
}
