//! Configuration management
//!
//! Settings are loaded from an optional YAML file merged with
//! `WEATHER_SDK_`-prefixed environment variables. A missing file or an
//! unparsable value fails at load time with [`Error::Config`] — construction
//! errors are never deferred to first use.

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default OpenWeather API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Main SDK configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SdkConfig {
    /// Per-instance cache configuration
    pub cache: CacheConfig,
    /// Background polling configuration
    pub polling: PollingConfig,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cities held per instance
    pub capacity: usize,
    /// Time-to-live for cached weather data
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            ttl: Duration::from_secs(600),
        }
    }
}

/// Background polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Period between refresh sweeps over the cached cities
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Base URL of the weather API (overridable for mock servers)
    pub base_url: String,
    /// Bound on each outbound request, connect included
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl SdkConfig {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist, cannot be parsed,
    /// or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        // Load from file if provided
        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (WEATHER_SDK_ prefix)
        figment = figment.merge(Env::prefixed("WEATHER_SDK_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if the cache capacity is zero or the base URL is empty.
    pub fn validate(&self) -> Result<()> {
        if self.cache.capacity == 0 {
            return Err(Error::Config(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        if self.http.base_url.trim().is_empty() {
            return Err(Error::Config("http.base_url must not be empty".to_string()));
        }
        Ok(())
    }
}
