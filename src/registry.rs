//! Instance registry — one live SDK instance per API key
//!
//! The registry is an explicit, injectable object rather than process-wide
//! static state: construct one, pass it to whatever façade needs it, and
//! call [`SdkRegistry::teardown`] when done. Check-and-insert goes through
//! the concurrent map's entry API, so simultaneous first-time callers for
//! the same key converge on a single instance — no duplicate construction,
//! no lost instance.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use crate::client::{OpenWeatherClient, WeatherFetcher};
use crate::config::SdkConfig;
use crate::instance::{Mode, WeatherSdk};
use crate::{Error, Result};

/// Registry of live [`WeatherSdk`] instances keyed by API key
pub struct SdkRegistry {
    instances: DashMap<String, Arc<WeatherSdk>>,
    config: SdkConfig,
}

impl SdkRegistry {
    /// Create an empty registry with the given configuration.
    #[must_use]
    pub fn new(config: SdkConfig) -> Self {
        Self {
            instances: DashMap::new(),
            config,
        }
    }

    /// Get the existing instance for `api_key`, or construct and register
    /// one with the production OpenWeather client.
    ///
    /// When an instance already exists, `mode` is ignored and the existing
    /// instance is returned as-is, whatever mode it was created with
    /// (first-writer-wins; a stricter mode-mismatch error is a candidate
    /// for a future revision).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed API key and
    /// [`Error::Config`] for invalid configuration — in both cases before
    /// any instance becomes visible to other callers.
    pub async fn get_or_create(&self, api_key: &str, mode: Mode) -> Result<Arc<WeatherSdk>> {
        // Fast path: reuse without building a fresh HTTP client. The entry
        // API below still handles the create/create race.
        if let Some(existing) = self.get(api_key) {
            return Ok(existing);
        }
        let fetcher: Arc<dyn WeatherFetcher> =
            Arc::new(OpenWeatherClient::new(api_key, &self.config.http)?);
        self.get_or_create_with(api_key, mode, fetcher).await
    }

    /// Like [`get_or_create`](Self::get_or_create), with a caller-supplied
    /// fetcher.
    ///
    /// Intended for alternative transports and for tests that script the
    /// fetch collaborator.
    pub async fn get_or_create_with(
        &self,
        api_key: &str,
        mode: Mode,
        fetcher: Arc<dyn WeatherFetcher>,
    ) -> Result<Arc<WeatherSdk>> {
        // Validate before touching the map so no partially-constructed
        // instance is ever observable.
        crate::instance::validate_api_key(api_key)?;
        self.config.validate()?;

        match self.instances.entry(api_key.to_string()) {
            Entry::Occupied(existing) => {
                debug!(%api_key, "Reusing existing SDK instance");
                Ok(Arc::clone(existing.get()))
            }
            Entry::Vacant(slot) => {
                let sdk = WeatherSdk::spawn(api_key, mode, fetcher, &self.config)?;
                slot.insert(Arc::clone(&sdk));
                info!(%api_key, ?mode, "Created SDK instance");
                Ok(sdk)
            }
        }
    }

    /// Get the existing instance for `api_key`, if any.
    #[must_use]
    pub fn get(&self, api_key: &str) -> Option<Arc<WeatherSdk>> {
        self.instances.get(api_key).map(|i| Arc::clone(&*i))
    }

    /// Façade-facing lookup: current weather for `city` via the instance
    /// registered for `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InstanceNotFound`] when no instance exists for the
    /// key, plus every error [`WeatherSdk::current_weather`] can produce.
    pub async fn current_weather(
        &self,
        api_key: &str,
        city: &str,
    ) -> Result<crate::model::WeatherReport> {
        let sdk = self
            .get(api_key)
            .ok_or_else(|| Error::InstanceNotFound(api_key.to_string()))?;
        sdk.current_weather(city).await
    }

    /// Remove and shut down the instance for `api_key`. No-op when absent.
    pub fn delete(&self, api_key: &str) {
        if let Some((_, sdk)) = self.instances.remove(api_key) {
            sdk.shutdown();
            info!(%api_key, "Deleted SDK instance");
        }
    }

    /// Shut down every remaining instance and clear the registry.
    pub fn teardown(&self) {
        for entry in &self.instances {
            entry.value().shutdown();
        }
        let count = self.instances.len();
        self.instances.clear();
        if count > 0 {
            info!(count, "Registry teardown complete");
        }
    }

    /// Number of live instances
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// `true` when no instances are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Default for SdkRegistry {
    fn default() -> Self {
        Self::new(SdkConfig::default())
    }
}
