//! Bounded TTL/LRU cache for weather reports
//!
//! Each SDK instance owns one cache. Entries are keyed by city name exactly
//! as supplied by the caller, expire after the configured TTL, and are capped
//! at a fixed capacity with least-recently-used eviction. Recency updates on
//! both reads and writes, so cities that are actively queried outlive cities
//! queried once and abandoned.
//!
//! The mutex guards only the map/order bookkeeping. Callers never fetch from
//! the network while holding it, so a slow fetch for one city cannot block
//! lookups for other cities.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::CacheConfig;
use crate::model::WeatherReport;
use crate::{Error, Result};

/// A cached weather report with its write timestamp
#[derive(Debug)]
struct CacheEntry {
    report: WeatherReport,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

/// Map plus recency list, mutated together under one lock.
///
/// `recency` holds every key exactly once: front is least recently used,
/// back is most recently used.
#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    recency: VecDeque<String>,
}

impl CacheInner {
    /// Move `key` to the most-recently-used position.
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(key.to_string());
    }

    /// Remove `key` from both the map and the recency list.
    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
    }
}

/// Thread-safe weather cache with TTL expiry and LRU eviction
#[derive(Debug)]
pub struct WeatherCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    ttl: Duration,
}

impl WeatherCache {
    /// Create a new empty cache from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configured capacity is zero.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        if config.capacity == 0 {
            return Err(Error::Config(
                "cache capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            inner: Mutex::new(CacheInner::default()),
            capacity: config.capacity,
            ttl: config.ttl,
        })
    }

    /// Get the cached report for `city` if present and not expired.
    ///
    /// A hit marks the city most-recently-used. An expired entry is evicted
    /// and `None` is returned — a stale report is never served.
    pub fn get(&self, city: &str) -> Option<WeatherReport> {
        let mut inner = self.inner.lock();

        let Some(entry) = inner.entries.get(city) else {
            return None;
        };

        if entry.is_expired(self.ttl) {
            inner.remove(city);
            debug!(%city, "Evicted expired cache entry");
            return None;
        }

        let report = entry.report.clone();
        inner.touch(city);
        Some(report)
    }

    /// Store a report for `city` with a fresh timestamp.
    ///
    /// Inserts or overwrites, marking the city most-recently-used. When the
    /// insert would exceed capacity, the current least-recently-used city is
    /// evicted first — never the city just inserted.
    pub fn put(&self, city: &str, report: WeatherReport) {
        let mut inner = self.inner.lock();

        inner.entries.insert(
            city.to_string(),
            CacheEntry {
                report,
                stored_at: Instant::now(),
            },
        );
        inner.touch(city);

        while inner.entries.len() > self.capacity {
            // The just-inserted key sits at the back, so with capacity >= 1
            // the front is always some other key.
            let Some(lru) = inner.recency.pop_front() else {
                break;
            };
            inner.entries.remove(&lru);
            debug!(city = %lru, "Evicted least-recently-used cache entry");
        }
    }

    /// Snapshot of all currently stored city names, in no guaranteed order.
    ///
    /// Used by the polling sweep; safe to call while other tasks mutate the
    /// cache.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Current number of cached cities
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// `true` when no cities are cached
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}
