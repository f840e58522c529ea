//! OpenWeather HTTP client
//!
//! The SDK core talks to the weather API through the [`WeatherFetcher`]
//! trait, so tests (and callers with their own transport) can swap in a
//! scripted implementation. [`OpenWeatherClient`] is the production
//! implementation over `reqwest`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{error, warn};

use crate::config::HttpConfig;
use crate::model::{Conditions, Sys, Temperature, Wind, WeatherReport};
use crate::{Error, Result};

/// Fetches structured weather data for a city, or fails with a typed error.
///
/// Implementations must be safe to call concurrently for different cities.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    /// Fetch the current weather for `city`
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReport>;
}

/// HTTP client for the OpenWeather current-weather endpoint
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>, config: &HttpConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fetch the raw response body for `city`, with status handling.
    async fn fetch_raw(&self, city: &str) -> Result<String> {
        let url = format!("{}/weather", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(%city, "Unauthorized access to weather API");
            return Err(Error::Api {
                status: status.as_u16(),
                message: "Invalid API key".to_string(),
            });
        }

        let body = response.text().await?;
        if !status.is_success() {
            warn!(%city, status = status.as_u16(), "Unexpected weather API response");
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("Failed to fetch weather data: {body}"),
            });
        }

        if body.is_empty() {
            warn!(%city, "Weather API returned an empty body");
            return Err(Error::Api {
                status: status.as_u16(),
                message: "Received empty response from API".to_string(),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReport> {
        let body = self.fetch_raw(city).await?;

        let payload: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            error!(%city, error = %e, "Failed to decode weather payload");
            Error::Payload(format!("Failed to decode weather payload: {e}"))
        })?;

        payload.into_report()
    }
}

// ── Wire format ───────────────────────────────────────────────────────────────

/// Raw shape of the OpenWeather `/weather` response (the fields we consume)
#[derive(Deserialize)]
struct ApiResponse {
    weather: Vec<ApiConditions>,
    main: ApiMain,
    #[serde(default)]
    visibility: u32,
    wind: ApiWind,
    #[serde(default)]
    dt: i64,
    sys: ApiSys,
    #[serde(default)]
    timezone: i32,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct ApiConditions {
    main: String,
    description: String,
}

#[derive(Deserialize)]
struct ApiMain {
    temp: f64,
    feels_like: f64,
}

#[derive(Deserialize)]
struct ApiWind {
    speed: f64,
}

#[derive(Deserialize)]
struct ApiSys {
    sunrise: i64,
    sunset: i64,
}

impl ApiResponse {
    /// Validate required fields and convert into the public model.
    fn into_report(self) -> Result<WeatherReport> {
        let conditions = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| Error::Payload("Missing 'weather' conditions".to_string()))?;
        if conditions.main.is_empty() {
            return Err(Error::Payload("Missing 'main' in 'weather' field".to_string()));
        }
        if conditions.description.is_empty() {
            return Err(Error::Payload(
                "Missing 'description' in 'weather' field".to_string(),
            ));
        }
        if self.name.is_empty() {
            return Err(Error::Payload("Missing 'name' field".to_string()));
        }

        Ok(WeatherReport {
            conditions: Conditions {
                main: conditions.main,
                description: conditions.description,
            },
            temperature: Temperature {
                temp: self.main.temp,
                feels_like: self.main.feels_like,
            },
            visibility: self.visibility,
            wind: Wind {
                speed: self.wind.speed,
            },
            datetime: self.dt,
            sys: Sys {
                sunrise: self.sys.sunrise,
                sunset: self.sys.sunset,
            },
            timezone: self.timezone,
            name: self.name,
        })
    }
}
