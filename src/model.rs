//! Weather data model
//!
//! Structured snapshot of current weather for one city, as returned by the
//! OpenWeather `/weather` endpoint. Field names in the serialized form match
//! the SDK's public JSON output (`temperature` for the readings block,
//! `feels_like` in snake case, and so on).

use serde::{Deserialize, Serialize};

/// Main weather condition and its description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// Main condition group (e.g. "Clear", "Rain")
    pub main: String,
    /// Detailed description (e.g. "clear sky", "light rain")
    pub description: String,
}

/// Temperature readings in Kelvin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    /// Actual temperature
    pub temp: f64,
    /// Perceived temperature accounting for humidity and wind
    pub feels_like: f64,
}

/// Wind data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Wind speed in meters per second
    pub speed: f64,
}

/// Sunrise and sunset times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    /// Sunrise time (UTC seconds since epoch)
    pub sunrise: i64,
    /// Sunset time (UTC seconds since epoch)
    pub sunset: i64,
}

/// Complete weather snapshot for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Weather condition
    #[serde(rename = "weather")]
    pub conditions: Conditions,
    /// Temperature readings
    pub temperature: Temperature,
    /// Visibility in meters (0 when not reported)
    #[serde(default)]
    pub visibility: u32,
    /// Wind data
    pub wind: Wind,
    /// Data timestamp (UTC seconds since epoch, 0 when not reported)
    #[serde(default)]
    pub datetime: i64,
    /// Sunrise/sunset information
    pub sys: Sys,
    /// Timezone offset from UTC in seconds (0 when not reported)
    #[serde(default)]
    pub timezone: i32,
    /// Location name as reported by the API
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_report() -> WeatherReport {
        WeatherReport {
            conditions: Conditions {
                main: "Clouds".to_string(),
                description: "scattered clouds".to_string(),
            },
            temperature: Temperature {
                temp: 281.75,
                feels_like: 279.92,
            },
            visibility: 10_000,
            wind: Wind { speed: 4.09 },
            datetime: 1_675_744_800,
            sys: Sys {
                sunrise: 1_675_751_262,
                sunset: 1_675_787_560,
            },
            timezone: 3600,
            name: "Paris".to_string(),
        }
    }

    #[test]
    fn report_serializes_with_public_field_names() {
        let json = serde_json::to_value(sample_report()).expect("serialize");

        assert_eq!(json["weather"]["main"], "Clouds");
        assert_eq!(json["temperature"]["feels_like"], 279.92);
        assert_eq!(json["sys"]["sunrise"], 1_675_751_262);
        assert_eq!(json["name"], "Paris");
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = sample_report();
        let json = serde_json::to_string(&report).expect("serialize");
        let back: WeatherReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, report);
    }

    #[test]
    fn optional_fields_default_to_zero() {
        let json = serde_json::json!({
            "weather": {"main": "Clear", "description": "clear sky"},
            "temperature": {"temp": 290.0, "feels_like": 289.0},
            "wind": {"speed": 1.2},
            "sys": {"sunrise": 1, "sunset": 2},
            "name": "Lima"
        });

        let report: WeatherReport = serde_json::from_value(json).expect("deserialize");
        assert_eq!(report.visibility, 0);
        assert_eq!(report.datetime, 0);
        assert_eq!(report.timezone, 0);
    }
}
