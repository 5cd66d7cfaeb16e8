//! Exchange suffix resolution.
//!
//! Maps a plain ticker plus an exchange code (ISO 10383 MIC) to the
//! provider-specific symbol. NSE tickers, for example, carry a ".NS"
//! suffix on Yahoo Finance.

use std::borrow::Cow;
use std::collections::HashMap;

use lazy_static::lazy_static;

/// Provider-specific exchange suffix and trading currency.
#[derive(Clone, Debug)]
pub struct ExchangeSuffix {
    /// The suffix to append to the ticker (e.g., ".NS" for Yahoo NSE).
    pub suffix: Cow<'static, str>,
    /// The trading currency for this exchange (e.g., "INR" for NSE).
    pub currency: Cow<'static, str>,
}

/// Default exchange when the caller does not specify one.
pub const DEFAULT_EXCHANGE: &str = "XNSE";

lazy_static! {
    /// Shared exchange mapping with the default entries loaded.
    pub static ref EXCHANGE_MAP: ExchangeMap = ExchangeMap::new();
}

/// MIC to provider suffix mapping database.
pub struct ExchangeMap {
    mappings: HashMap<&'static str, ExchangeSuffix>,
}

impl Default for ExchangeMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeMap {
    /// Create a new ExchangeMap with default mappings.
    pub fn new() -> Self {
        let mut map = Self {
            mappings: HashMap::new(),
        };
        map.load_defaults();
        map
    }

    fn load_defaults(&mut self) {
        // ===== India =====
        // National Stock Exchange of India
        self.add("XNSE", ".NS", "INR");
        // BSE (Bombay Stock Exchange)
        self.add("XBOM", ".BO", "INR");

        // ===== North America =====
        // NYSE
        self.add("XNYS", "", "USD");
        // NASDAQ
        self.add("XNAS", "", "USD");
        // Toronto Stock Exchange
        self.add("XTSE", ".TO", "CAD");

        // ===== UK =====
        // London Stock Exchange
        self.add("XLON", ".L", "GBP");
    }

    fn add(&mut self, mic: &'static str, suffix: &'static str, currency: &'static str) {
        self.mappings.insert(
            mic,
            ExchangeSuffix {
                suffix: Cow::Borrowed(suffix),
                currency: Cow::Borrowed(currency),
            },
        );
    }

    /// Look up the suffix entry for an exchange.
    pub fn get(&self, mic: &str) -> Option<&ExchangeSuffix> {
        self.mappings.get(mic)
    }

    /// Build the provider-specific symbol for a ticker on an exchange.
    /// Unknown exchanges pass the ticker through unchanged.
    pub fn provider_symbol(&self, ticker: &str, mic: &str) -> String {
        match self.mappings.get(mic) {
            Some(entry) => format!("{}{}", ticker, entry.suffix),
            None => ticker.to_string(),
        }
    }

    /// Trading currency for an exchange, defaulting to "USD" when unknown.
    pub fn currency(&self, mic: &str) -> &str {
        self.mappings
            .get(mic)
            .map(|entry| entry.currency.as_ref())
            .unwrap_or("USD")
    }

    /// Strip a known exchange suffix from a provider symbol, returning the
    /// plain ticker. Symbols without a known suffix are returned unchanged.
    pub fn strip_suffix<'a>(&self, provider_symbol: &'a str) -> &'a str {
        for entry in self.mappings.values() {
            if !entry.suffix.is_empty() {
                if let Some(ticker) = provider_symbol.strip_suffix(entry.suffix.as_ref()) {
                    return ticker;
                }
            }
        }
        provider_symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nse_suffix() {
        let map = ExchangeMap::new();
        assert_eq!(map.provider_symbol("NIFTYBEES", "XNSE"), "NIFTYBEES.NS");
        assert_eq!(map.currency("XNSE"), "INR");
    }

    #[test]
    fn test_us_exchanges_have_no_suffix() {
        let map = ExchangeMap::new();
        assert_eq!(map.provider_symbol("AAPL", "XNAS"), "AAPL");
        assert_eq!(map.provider_symbol("SPY", "XNYS"), "SPY");
    }

    #[test]
    fn test_unknown_exchange_passes_through() {
        let map = ExchangeMap::new();
        assert_eq!(map.provider_symbol("FOO", "XXXX"), "FOO");
        assert_eq!(map.currency("XXXX"), "USD");
    }

    #[test]
    fn test_strip_suffix_round_trip() {
        let map = ExchangeMap::new();
        for ticker in ["NIFTYBEES", "GOLDBEES", "BANKBEES"] {
            let provider = map.provider_symbol(ticker, "XNSE");
            assert_eq!(map.strip_suffix(&provider), ticker);
        }
    }

    #[test]
    fn test_strip_suffix_leaves_plain_symbols() {
        let map = ExchangeMap::new();
        assert_eq!(map.strip_suffix("AAPL"), "AAPL");
    }
}
