//! Weather upstream client trait and OpenWeatherMap implementation.
//!
//! The [`WeatherClient`] trait is the cache's only view of the upstream, so
//! tests can substitute a counting double. [`OpenWeatherClient`] fetches the
//! free current-weather endpoint via `reqwest`.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use super::error::WeatherError;
use super::observation::RawWeather;

/// Default OpenWeatherMap current-weather endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Default HTTP timeout for a weather request.
pub const DEFAULT_WEATHER_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for fetching raw weather at a point.
pub trait WeatherClient: Send + Sync {
    /// Fetch current conditions at the given coordinate.
    fn fetch(
        &self,
        lat: f64,
        lon: f64,
    ) -> impl Future<Output = Result<RawWeather, WeatherError>> + Send;
}

/// OpenWeatherMap current-weather response.
///
/// Only the fields we use are deserialised; everything else is ignored.
#[derive(Debug, Deserialize)]
struct OwmResponse {
    #[serde(default)]
    wind: OwmWind,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    main: Option<OwmMain>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

/// OpenWeatherMap client using direct HTTP requests.
///
/// Uses a reusable `reqwest::Client` with connection pooling and timeouts.
/// With no API key every fetch fails fast with [`WeatherError::MissingApiKey`],
/// which the pipeline treats like any other upstream outage.
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    /// Create a client for the given endpoint.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Http(e.to_string()))?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("Weather API key not set, all vessels will carry neutral weather");
        }

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl WeatherClient for OpenWeatherClient {
    async fn fetch(&self, lat: f64, lon: f64) -> Result<RawWeather, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WeatherError::Http(e.to_string()))?;

        let raw = parse_current_weather(&bytes)?;

        tracing::debug!(
            lat,
            lon,
            wind_speed_mps = raw.wind_speed_mps,
            condition = %raw.condition,
            "Weather fetched"
        );

        Ok(raw)
    }
}

/// Parses an OpenWeatherMap current-weather body.
///
/// The free tier carries no sea state, so `wave_height_m` is always `None`.
fn parse_current_weather(body: &[u8]) -> Result<RawWeather, WeatherError> {
    let data: OwmResponse =
        serde_json::from_slice(body).map_err(|e| WeatherError::Parse(e.to_string()))?;

    let condition = data
        .weather
        .first()
        .map(|c| c.main.to_lowercase())
        .unwrap_or_else(|| "clear".to_string());

    Ok(RawWeather {
        wind_speed_mps: data.wind.speed,
        wind_direction_deg: data.wind.deg,
        wave_height_m: None,
        temperature_c: data.main.map(|m| m.temp).unwrap_or(0.0),
        condition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_weather() {
        let json = br#"{
            "coord": {"lon": 103.8, "lat": 1.25},
            "weather": [{"id": 211, "main": "Thunderstorm", "description": "thunderstorm"}],
            "main": {"temp": 27.4, "humidity": 88},
            "wind": {"speed": 9.3, "deg": 140, "gust": 14.1},
            "name": "Singapore"
        }"#;

        let raw = parse_current_weather(json).unwrap();
        assert_eq!(raw.wind_speed_mps, 9.3);
        assert_eq!(raw.wind_direction_deg, 140.0);
        assert_eq!(raw.temperature_c, 27.4);
        assert_eq!(raw.condition, "thunderstorm");
        assert!(raw.wave_height_m.is_none());
    }

    #[test]
    fn test_parse_tolerates_missing_sections() {
        let raw = parse_current_weather(br#"{"name": "nowhere"}"#).unwrap();
        assert_eq!(raw.wind_speed_mps, 0.0);
        assert_eq!(raw.condition, "clear");
        assert_eq!(raw.temperature_c, 0.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_current_weather(b"<html>"),
            Err(WeatherError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let client =
            OpenWeatherClient::new(DEFAULT_WEATHER_URL, Some("  ".to_string()), DEFAULT_WEATHER_HTTP_TIMEOUT)
                .unwrap();
        assert!(!client.has_api_key());
        assert_eq!(
            client.fetch(1.25, 103.8).await,
            Err(WeatherError::MissingApiKey)
        );
    }
}
