//! Weather SDK Library
//!
//! Client SDK for the OpenWeather current-weather API with per-API-key
//! instance management, bounded TTL/LRU caching and an optional background
//! polling mode.
//!
//! # Features
//!
//! - **On-Demand Mode**: weather is fetched when a lookup misses the cache
//! - **Polling Mode**: a background task refreshes every cached city on a
//!   fixed period so lookups are served warm
//! - **Bounded Cache**: at most 10 cities per instance, entries expire after
//!   a configurable TTL (default 10 minutes), LRU eviction on overflow
//! - **One Instance Per Key**: the registry guarantees a single live
//!   instance per API key, with explicit delete and teardown
//!
//! # Example
//!
//! ```no_run
//! use weather_sdk::{Mode, SdkConfig, SdkRegistry};
//!
//! # async fn run() -> weather_sdk::Result<()> {
//! let registry = SdkRegistry::new(SdkConfig::default());
//! let sdk = registry.get_or_create("my-api-key", Mode::OnDemand).await?;
//! let report = sdk.current_weather("London").await?;
//! println!("{}: {}", report.name, report.conditions.description);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod instance;
pub mod model;
pub mod registry;

pub use cache::WeatherCache;
pub use client::{OpenWeatherClient, WeatherFetcher};
pub use config::SdkConfig;
pub use error::{Error, Result};
pub use instance::{Mode, WeatherSdk};
pub use model::WeatherReport;
pub use registry::SdkRegistry;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
