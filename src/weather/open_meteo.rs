//! `OpenMeteo` weather source
//!
//! Fetches current conditions plus a 7-day daily forecast from the
//! Open-Meteo forecast API (no API key required). Responses are reshaped
//! into [`RawWeatherData`] without touching values or units.

use super::{ProviderError, RawCurrent, RawDay, RawWeatherData, WeatherSource};
use crate::catalog::Coordinates;
use crate::config::WeatherConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const PROVIDER_NAME: &str = "open-meteo";
const FORECAST_DAYS: u8 = 7;

#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    client: Client,
    base_url: String,
}

impl OpenMeteoSource {
    /// Build a source from application configuration
    pub fn new(config: &WeatherConfig) -> anyhow::Result<Self> {
        Self::with_base_url(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Build a source against an explicit base URL (tests point this at a
    /// mock server)
    pub fn with_base_url(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn forecast_url(&self, location: &Coordinates) -> String {
        format!(
            "{}/v1/forecast?latitude={:.4}&longitude={:.4}\
             &current=temperature_2m,wind_speed_10m,weather_code\
             &daily=temperature_2m_max,temperature_2m_min,weather_code,snowfall_sum\
             &forecast_days={}&timezone=UTC",
            self.base_url, location.latitude, location.longitude, FORECAST_DAYS
        )
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    async fn fetch(&self, location: &Coordinates) -> Result<RawWeatherData, ProviderError> {
        let url = self.forecast_url(location);
        tracing::debug!("Fetching weather from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unavailable {
                status: Some(status.as_u16()),
            });
        }

        let body = response.text().await.map_err(classify_transport_error)?;
        let parsed: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse {
                message: e.to_string(),
            })?;

        Ok(parsed.into_raw())
    }
}

fn classify_transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else if error.is_decode() {
        ProviderError::MalformedResponse {
            message: error.to_string(),
        }
    } else {
        ProviderError::Unavailable {
            status: error.status().map(|s| s.as_u16()),
        }
    }
}

/// Forecast response from the `OpenMeteo` API
#[derive(Debug, serde::Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
    current_units: Option<CurrentUnits>,
    daily: Option<DailyBlock>,
    daily_units: Option<DailyUnits>,
}

#[derive(Debug, serde::Deserialize)]
struct CurrentBlock {
    time: Option<String>,
    #[serde(rename = "temperature_2m")]
    temperature: Option<f64>,
    #[serde(rename = "wind_speed_10m")]
    wind_speed: Option<f64>,
    weather_code: Option<i32>,
}

#[derive(Debug, serde::Deserialize)]
struct CurrentUnits {
    #[serde(rename = "temperature_2m")]
    temperature: Option<String>,
    #[serde(rename = "wind_speed_10m")]
    wind_speed: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    temp_max: Option<Vec<Option<f64>>>,
    #[serde(rename = "temperature_2m_min")]
    temp_min: Option<Vec<Option<f64>>>,
    weather_code: Option<Vec<Option<i32>>>,
    #[serde(rename = "snowfall_sum")]
    snowfall: Option<Vec<Option<f64>>>,
}

#[derive(Debug, serde::Deserialize)]
struct DailyUnits {
    #[serde(rename = "snowfall_sum")]
    snowfall: Option<String>,
}

impl ForecastResponse {
    /// Reshape the columnar Open-Meteo payload into per-day rows,
    /// preserving provenance and provider-reported units.
    fn into_raw(self) -> RawWeatherData {
        let current = self.current.map_or_else(RawCurrent::default, |block| {
            RawCurrent {
                temperature: block.temperature,
                wind_speed: block.wind_speed,
                weather_code: block.weather_code,
                observed_at: block.time,
            }
        });

        let daily = self.daily.map_or_else(Vec::new, |block| {
            block
                .time
                .iter()
                .enumerate()
                .map(|(i, date)| RawDay {
                    date: date.clone(),
                    temp_max: column(&block.temp_max, i),
                    temp_min: column(&block.temp_min, i),
                    weather_code: column(&block.weather_code, i),
                    snowfall: column(&block.snowfall, i),
                })
                .collect()
        });

        let (temperature_unit, wind_speed_unit) = match self.current_units {
            Some(units) => (units.temperature, units.wind_speed),
            None => (None, None),
        };

        RawWeatherData {
            provider: PROVIDER_NAME.to_string(),
            temperature_unit,
            wind_speed_unit,
            snowfall_unit: self.daily_units.and_then(|units| units.snowfall),
            current,
            daily,
        }
    }
}

fn column<T: Copy>(values: &Option<Vec<Option<T>>>, index: usize) -> Option<T> {
    values
        .as_ref()
        .and_then(|v| v.get(index).copied().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn aspen() -> Coordinates {
        Coordinates {
            latitude: 39.1911,
            longitude: -106.8175,
        }
    }

    async fn source_for(server: &MockServer) -> OpenMeteoSource {
        OpenMeteoSource::with_base_url(server.uri(), Duration::from_millis(500))
            .expect("client should build")
    }

    fn sample_payload() -> serde_json::Value {
        json!({
            "latitude": 39.1911,
            "longitude": -106.8175,
            "current_units": {
                "temperature_2m": "°C",
                "wind_speed_10m": "km/h"
            },
            "current": {
                "time": "2026-01-10T12:00",
                "temperature_2m": -5.3,
                "wind_speed_10m": 14.4,
                "weather_code": 71
            },
            "daily_units": {
                "snowfall_sum": "cm"
            },
            "daily": {
                "time": ["2026-01-10", "2026-01-11"],
                "temperature_2m_max": [-1.0, 0.5],
                "temperature_2m_min": [-9.0, -7.5],
                "weather_code": [71, 3],
                "snowfall_sum": [4.2, 0.0]
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_reshapes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "39.1911"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_payload()))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let raw = source.fetch(&aspen()).await.expect("fetch should succeed");

        assert_eq!(raw.provider, "open-meteo");
        assert_eq!(raw.temperature_unit.as_deref(), Some("°C"));
        assert_eq!(raw.wind_speed_unit.as_deref(), Some("km/h"));
        assert_eq!(raw.snowfall_unit.as_deref(), Some("cm"));
        assert_eq!(raw.current.temperature, Some(-5.3));
        assert_eq!(raw.current.weather_code, Some(71));
        assert_eq!(raw.current.observed_at.as_deref(), Some("2026-01-10T12:00"));
        assert_eq!(raw.daily.len(), 2);
        assert_eq!(raw.daily[0].date, "2026-01-10");
        assert_eq!(raw.daily[0].snowfall, Some(4.2));
        assert_eq!(raw.daily[1].temp_max, Some(0.5));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.fetch(&aspen()).await.unwrap_err();
        assert_eq!(err, ProviderError::Unavailable { status: Some(503) });
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.fetch(&aspen()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_slow_upstream_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sample_payload())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.fetch(&aspen()).await.unwrap_err();
        assert_eq!(err, ProviderError::Timeout);
    }

    #[tokio::test]
    async fn test_missing_blocks_yield_empty_raw_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": 39.1911,
                "longitude": -106.8175
            })))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let raw = source.fetch(&aspen()).await.expect("fetch should succeed");
        assert_eq!(raw.current, RawCurrent::default());
        assert!(raw.daily.is_empty());
    }
}
