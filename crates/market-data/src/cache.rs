//! In-memory TTL cache for provider responses.
//!
//! Caching here is purely an I/O economy: it bounds how often the provider
//! is hit for identical requests and carries no correctness obligations.
//! A manual refresh calls [`QuoteCache::clear_all`] and re-runs the full
//! pipeline.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::models::{LatestQuotePair, Quote};

/// Default TTL for latest/previous-close quote pairs.
pub const DEFAULT_PAIR_TTL: Duration = Duration::from_secs(300);

/// Default TTL for historical close series.
pub const DEFAULT_HISTORY_TTL: Duration = Duration::from_secs(600);

struct CacheEntry<T> {
    inserted: Instant,
    value: T,
}

/// TTL-bounded cache keyed by request shape (symbols + window).
///
/// Quote pairs and historical series have separate stores with separate
/// TTLs, mirroring their different staleness tolerances.
pub struct QuoteCache {
    pairs: Mutex<HashMap<String, CacheEntry<HashMap<String, LatestQuotePair>>>>,
    history: Mutex<HashMap<String, CacheEntry<HashMap<String, Vec<Quote>>>>>,
    pair_ttl: Duration,
    history_ttl: Duration,
}

impl QuoteCache {
    /// Create a cache with the default TTLs (pairs 300 s, history 600 s).
    pub fn new() -> Self {
        Self::with_ttls(DEFAULT_PAIR_TTL, DEFAULT_HISTORY_TTL)
    }

    /// Create a cache with caller-chosen TTLs.
    pub fn with_ttls(pair_ttl: Duration, history_ttl: Duration) -> Self {
        Self {
            pairs: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            pair_ttl,
            history_ttl,
        }
    }

    /// Get a cached quote-pair response, if present and fresh.
    pub async fn get_pairs(&self, key: &str) -> Option<HashMap<String, LatestQuotePair>> {
        let mut guard = self.pairs.lock().await;
        Self::get_fresh(&mut guard, key, self.pair_ttl)
    }

    /// Store a quote-pair response.
    pub async fn set_pairs(&self, key: String, value: HashMap<String, LatestQuotePair>) {
        let mut guard = self.pairs.lock().await;
        guard.insert(
            key,
            CacheEntry {
                inserted: Instant::now(),
                value,
            },
        );
    }

    /// Get a cached historical response, if present and fresh.
    pub async fn get_history(&self, key: &str) -> Option<HashMap<String, Vec<Quote>>> {
        let mut guard = self.history.lock().await;
        Self::get_fresh(&mut guard, key, self.history_ttl)
    }

    /// Store a historical response.
    pub async fn set_history(&self, key: String, value: HashMap<String, Vec<Quote>>) {
        let mut guard = self.history.lock().await;
        guard.insert(
            key,
            CacheEntry {
                inserted: Instant::now(),
                value,
            },
        );
    }

    /// Drop every cached response. Used by manual refresh.
    pub async fn clear_all(&self) {
        self.pairs.lock().await.clear();
        self.history.lock().await.clear();
    }

    fn get_fresh<T: Clone>(
        store: &mut HashMap<String, CacheEntry<T>>,
        key: &str,
        ttl: Duration,
    ) -> Option<T> {
        match store.get(key) {
            Some(entry) if entry.inserted.elapsed() < ttl => Some(entry.value.clone()),
            Some(_) => {
                store.remove(key);
                None
            }
            None => None,
        }
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}
