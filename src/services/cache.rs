use crate::types::PriceSeries;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A thread-safe TTL cache of fetched price series, keyed by ticker and lookback.
pub struct SeriesCache {
    data: DashMap<String, CacheEntry>,
    ttl: Duration,
}

struct CacheEntry {
    series: Arc<PriceSeries>,
    expires_at: Instant,
}

fn cache_key(ticker: &str, lookback_days: u32) -> String {
    format!("{}:{}", ticker.to_uppercase(), lookback_days)
}

impl SeriesCache {
    /// Create a new cache. A zero TTL disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: DashMap::new(),
            ttl,
        }
    }

    /// Get a series if present and not expired.
    pub fn get(&self, ticker: &str, lookback_days: u32) -> Option<Arc<PriceSeries>> {
        let key = cache_key(ticker, lookback_days);
        let entry = self.data.get(&key)?;
        if entry.expires_at > Instant::now() {
            Some(entry.series.clone())
        } else {
            drop(entry);
            self.data.remove(&key);
            None
        }
    }

    /// Store a series. Empty series are not cached so a retry can pick up new listings.
    pub fn insert(&self, lookback_days: u32, series: Arc<PriceSeries>) {
        if self.ttl.is_zero() || series.is_empty() {
            return;
        }
        self.data.insert(
            cache_key(&series.ticker, lookback_days),
            CacheEntry {
                series,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Remove all expired entries from the cache.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.data.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of entries, including expired ones not yet cleaned up.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
