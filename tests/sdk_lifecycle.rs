//! End-to-end lifecycle tests for the Weather SDK
//!
//! Drives the public surface the way a façade would: registry construction,
//! per-key instance management, cached lookups, background polling and
//! teardown — with a scripted in-memory fetcher standing in for the
//! OpenWeather API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;
use pretty_assertions::assert_eq;

use weather_sdk::model::{Conditions, Sys, Temperature, Wind};
use weather_sdk::{Error, Mode, Result, SdkConfig, SdkRegistry, WeatherFetcher, WeatherReport};

/// In-memory fetcher: counts calls per city and fails on demand.
struct FakeWeatherApi {
    calls: AtomicUsize,
    failing: DashSet<String>,
}

impl FakeWeatherApi {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failing: DashSet::new(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherFetcher for FakeWeatherApi {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(city) {
            return Err(Error::Api {
                status: 500,
                message: format!("simulated outage for {city}"),
            });
        }
        Ok(WeatherReport {
            conditions: Conditions {
                main: "Clouds".to_string(),
                description: "broken clouds".to_string(),
            },
            temperature: Temperature {
                temp: 284.2,
                feels_like: 282.9,
            },
            visibility: 10_000,
            wind: Wind { speed: 5.1 },
            datetime: 1_700_000_000,
            sys: Sys {
                sunrise: 1_700_000_100,
                sunset: 1_700_040_000,
            },
            timezone: 3600,
            name: city.to_string(),
        })
    }
}

fn config(ttl: Duration, poll_interval: Duration) -> SdkConfig {
    let mut config = SdkConfig::default();
    config.cache.ttl = ttl;
    config.polling.interval = poll_interval;
    config
}

#[tokio::test]
async fn on_demand_flow_caches_per_city() {
    let api = FakeWeatherApi::new();
    let registry = SdkRegistry::default();
    let sdk = registry
        .get_or_create_with("itest-key", Mode::OnDemand, api.clone())
        .await
        .expect("create instance");

    let london = sdk.current_weather("London").await.expect("lookup");
    assert_eq!(london.name, "London");
    assert_eq!(london.conditions.description, "broken clouds");

    // Repeat lookups for the same city are served from cache.
    for _ in 0..5 {
        sdk.current_weather("London").await.expect("cached lookup");
    }
    assert_eq!(api.calls(), 1);

    // A different city is its own entry.
    sdk.current_weather("Madrid").await.expect("lookup");
    assert_eq!(api.calls(), 2);
    assert_eq!(sdk.cache().len(), 2);
}

#[tokio::test]
async fn capacity_bound_holds_across_many_cities() {
    let api = FakeWeatherApi::new();
    let registry = SdkRegistry::default();
    let sdk = registry
        .get_or_create_with("itest-key", Mode::OnDemand, api.clone())
        .await
        .expect("create instance");

    let cities = [
        "Amsterdam", "Berlin", "Cairo", "Dakar", "Edinburgh", "Florence", "Geneva", "Hanoi",
        "Istanbul", "Jakarta", "Kyoto", "Lisbon",
    ];
    for city in cities {
        sdk.current_weather(city).await.expect("lookup");
    }

    assert_eq!(sdk.cache().len(), 10, "default capacity is ten cities");
    // The two least recently used cities fell out.
    assert!(sdk.cache().get("Amsterdam").is_none());
    assert!(sdk.cache().get("Berlin").is_none());
    assert!(sdk.cache().get("Lisbon").is_some());
}

#[tokio::test]
async fn polling_recovers_after_transient_outage() {
    let api = FakeWeatherApi::new();
    let registry = SdkRegistry::new(config(
        Duration::from_secs(600),
        Duration::from_millis(40),
    ));
    let sdk = registry
        .get_or_create_with("itest-key", Mode::Polling, api.clone())
        .await
        .expect("create instance");

    sdk.current_weather("Oslo").await.expect("lookup");
    sdk.current_weather("Bergen").await.expect("lookup");

    // Bergen's upstream goes down; sweeps keep refreshing Oslo and keep
    // running despite the per-city failures.
    api.failing.insert("Bergen".to_string());
    tokio::time::sleep(Duration::from_millis(150)).await;
    let during_outage = api.calls();
    assert!(during_outage > 2, "sweeps must continue during the outage");

    // Outage ends; Bergen refreshes again on subsequent sweeps.
    api.failing.remove("Bergen");
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(api.calls() > during_outage);
    assert!(sdk.cache().get("Bergen").is_some());

    registry.teardown();
}

#[tokio::test]
async fn delete_then_recreate_yields_a_fresh_instance() {
    let api = FakeWeatherApi::new();
    let registry = SdkRegistry::default();

    let first = registry
        .get_or_create_with("itest-key", Mode::OnDemand, api.clone())
        .await
        .expect("create instance");
    first.current_weather("London").await.expect("lookup");

    registry.delete("itest-key");
    assert!(first.is_shutdown());
    assert!(matches!(
        first.current_weather("London").await,
        Err(Error::Shutdown)
    ));

    let second = registry
        .get_or_create_with("itest-key", Mode::OnDemand, api.clone())
        .await
        .expect("recreate instance");
    assert!(!Arc::ptr_eq(&first, &second));

    // The fresh instance has a fresh cache.
    assert!(second.cache().is_empty());
    second.current_weather("London").await.expect("lookup");
}

#[tokio::test]
async fn facade_lookup_goes_through_the_registry() {
    let api = FakeWeatherApi::new();
    let registry = SdkRegistry::default();
    registry
        .get_or_create_with("itest-key", Mode::OnDemand, api.clone())
        .await
        .expect("create instance");

    let report = registry
        .current_weather("itest-key", "Vienna")
        .await
        .expect("lookup");
    assert_eq!(report.name, "Vienna");

    let err = registry
        .current_weather("other-key", "Vienna")
        .await
        .expect_err("unknown key must fail");
    assert!(matches!(err, Error::InstanceNotFound(_)));
}

#[tokio::test]
async fn teardown_leaves_no_running_pollers() {
    let api = FakeWeatherApi::new();
    let registry = SdkRegistry::new(config(
        Duration::from_secs(600),
        Duration::from_millis(40),
    ));
    let sdk = registry
        .get_or_create_with("itest-key", Mode::Polling, api.clone())
        .await
        .expect("create instance");
    sdk.current_weather("Oslo").await.expect("lookup");

    registry.teardown();
    assert!(registry.is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = api.calls();
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(api.calls(), settled, "no sweep may run after teardown");
}
