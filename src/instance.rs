//! SDK instance: lookup path, background polling, shutdown
//!
//! One [`WeatherSdk`] exists per API key (enforced by
//! [`crate::registry::SdkRegistry`]). Each instance owns one
//! [`WeatherCache`] and, in [`Mode::Polling`], one background task that
//! periodically re-fetches every cached city.
//!
//! # Lookup path
//!
//! 1. Fail fast when the instance is shut down — no fetch, no cache access.
//! 2. Validate the city name.
//! 3. Serve from cache when present and fresh.
//! 4. Otherwise fetch (outside any lock), store, and return. Fetch errors
//!    propagate to the caller untouched; retry policy belongs to the caller.
//!
//! # Polling
//!
//! The poll task ticks on a fixed period with the first sweep immediate. A
//! sweep snapshots the cache's key set and refreshes each city through the
//! same fetcher; a failure for one city is logged and does not abort the
//! sweep. The task stops when [`WeatherSdk::shutdown`] signals it or when
//! the instance is dropped (the task only holds a weak reference).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::cache::WeatherCache;
use crate::client::WeatherFetcher;
use crate::config::SdkConfig;
use crate::model::WeatherReport;
use crate::{Error, Result};

/// Operational mode of an SDK instance, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Fetch weather data only when a lookup misses the cache
    OnDemand,
    /// Additionally refresh all cached cities on a fixed period
    Polling,
}

/// A live SDK instance bound to one API key
pub struct WeatherSdk {
    api_key: String,
    mode: Mode,
    fetcher: Arc<dyn WeatherFetcher>,
    cache: WeatherCache,
    is_shutdown: AtomicBool,
    /// Present only in polling mode; signals the poll task to stop.
    poll_stop: Option<broadcast::Sender<()>>,
}

impl std::fmt::Debug for WeatherSdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherSdk")
            .field("mode", &self.mode)
            .field("cache", &self.cache)
            .field("is_shutdown", &self.is_shutdown)
            .finish_non_exhaustive()
    }
}

impl WeatherSdk {
    /// Construct an instance and, in polling mode, start its refresh task.
    ///
    /// Must be called within a tokio runtime when `mode` is
    /// [`Mode::Polling`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed API key and
    /// [`Error::Config`] for an invalid cache configuration. Nothing is
    /// registered or spawned on failure.
    pub fn spawn(
        api_key: &str,
        mode: Mode,
        fetcher: Arc<dyn WeatherFetcher>,
        config: &SdkConfig,
    ) -> Result<Arc<Self>> {
        validate_api_key(api_key)?;
        let cache = WeatherCache::new(&config.cache)?;

        let poll_stop = match mode {
            Mode::Polling => Some(broadcast::channel(1).0),
            Mode::OnDemand => None,
        };

        let sdk = Arc::new(Self {
            api_key: api_key.to_string(),
            mode,
            fetcher,
            cache,
            is_shutdown: AtomicBool::new(false),
            poll_stop,
        });

        if let Some(stop_tx) = &sdk.poll_stop {
            spawn_poll_task(
                Arc::downgrade(&sdk),
                stop_tx.subscribe(),
                config.polling.interval,
            );
        }

        Ok(sdk)
    }

    /// The API key this instance is bound to
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The operational mode fixed at construction
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// `true` once [`shutdown`](Self::shutdown) has been called
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// The instance's cache (exposed for inspection and tests)
    #[must_use]
    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Get the current weather for `city`, from cache when fresh.
    ///
    /// The city name is validated, but the cache key is the string exactly
    /// as supplied — `"Paris"` and `" Paris"` are distinct entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shutdown`] after [`shutdown`](Self::shutdown),
    /// [`Error::Validation`] for a malformed city name, and the fetcher's
    /// error untouched when a cache miss fails to fetch.
    pub async fn current_weather(&self, city: &str) -> Result<WeatherReport> {
        if self.is_shutdown() {
            return Err(Error::Shutdown);
        }
        validate_city_name(city)?;

        if let Some(report) = self.cache.get(city) {
            debug!(%city, "Cache hit");
            return Ok(report);
        }

        // Miss or expired: fetch without holding any lock, then store.
        let report = self.fetcher.fetch_weather(city).await?;
        self.cache.put(city, report.clone());
        Ok(report)
    }

    /// Get the current weather for `city` as a JSON value.
    pub async fn current_weather_json(&self, city: &str) -> Result<serde_json::Value> {
        let report = self.current_weather(city).await?;
        Ok(serde_json::to_value(report)?)
    }

    /// Shut the instance down.
    ///
    /// Idempotent. Sets the shutdown flag so every subsequent lookup fails
    /// fast with [`Error::Shutdown`], then signals the poll task. No sweep
    /// starting after this returns performs any work; a sweep already in
    /// flight may finish and may still write to the cache.
    pub fn shutdown(&self) {
        if self.is_shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(stop_tx) = &self.poll_stop {
            let _ = stop_tx.send(());
        }
        info!(api_key = %self.api_key, "Weather SDK instance shut down");
    }
}

/// Spawn the periodic refresh task for a polling-mode instance.
///
/// Holds only a `Weak` handle so a dropped instance stops its task even
/// without an explicit shutdown call.
fn spawn_poll_task(
    sdk: Weak<WeatherSdk>,
    mut stop_rx: broadcast::Receiver<()>,
    interval: std::time::Duration,
) {
    tokio::spawn(async move {
        // First tick fires immediately.
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(sdk) = sdk.upgrade() else { break };
                    if sdk.is_shutdown() {
                        break;
                    }
                    refresh_sweep(&sdk).await;
                }
                _ = stop_rx.recv() => {
                    debug!("Poll task stopping");
                    break;
                }
            }
        }
    });
}

/// Refresh every cached city once.
///
/// Works from a snapshot of the key set; per-city failures are logged and
/// isolated so one bad city never aborts the sweep.
async fn refresh_sweep(sdk: &WeatherSdk) {
    for city in sdk.cache.keys() {
        match sdk.fetcher.fetch_weather(&city).await {
            Ok(report) => {
                sdk.cache.put(&city, report);
                info!(%city, "Refreshed weather data");
            }
            Err(e) => {
                warn!(%city, error = %e, "Failed to refresh weather data");
            }
        }
    }
}

// ── Input validation ──────────────────────────────────────────────────────────

/// Validate an API key: non-empty after trimming, alphanumeric plus `-`/`_`.
pub(crate) fn validate_api_key(api_key: &str) -> Result<()> {
    static API_KEY_RE: OnceLock<Regex> = OnceLock::new();

    let trimmed = api_key.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("API key cannot be empty"));
    }
    let re = API_KEY_RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static regex"));
    if !re.is_match(trimmed) {
        return Err(Error::validation("API key contains invalid characters"));
    }
    Ok(())
}

/// Validate a city name: non-empty after trimming; letters, spaces, `.`,
/// `'` and `-` only.
pub(crate) fn validate_city_name(city: &str) -> Result<()> {
    static CITY_RE: OnceLock<Regex> = OnceLock::new();

    let trimmed = city.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("City name cannot be empty"));
    }
    let re = CITY_RE.get_or_init(|| Regex::new(r"^[a-zA-Z\s.'-]+$").expect("static regex"));
    if !re.is_match(trimmed) {
        return Err(Error::validation("City name contains invalid characters"));
    }
    Ok(())
}
