//! Weather source abstraction
//!
//! A `WeatherSource` issues the outbound call to an upstream weather
//! provider for a resolved resort's coordinates. It returns the provider's
//! data reshaped into [`RawWeatherData`] without interpreting values or
//! units; normalization is the aggregator's job. Transient failures are
//! classified and may be retried exactly once.

use crate::catalog::Coordinates;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod open_meteo;

/// Upstream provider failure, classified for the error taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider request timed out")]
    Timeout,

    #[error("provider unavailable (status {status:?})")]
    Unavailable { status: Option<u16> },

    #[error("malformed provider response: {message}")]
    MalformedResponse { message: String },
}

impl ProviderError {
    /// Whether a single bounded retry is worthwhile. A malformed body
    /// would parse identically the second time.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, ProviderError::MalformedResponse { .. })
    }
}

/// Current-conditions block as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCurrent {
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub weather_code: Option<i32>,
    /// Provider-formatted observation timestamp
    pub observed_at: Option<String>,
}

/// One forecast day as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDay {
    /// Provider-formatted date (ISO `YYYY-MM-DD`)
    pub date: String,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub weather_code: Option<i32>,
    pub snowfall: Option<f64>,
}

/// Provider data before validation and unit normalization. Units are
/// carried as the provider reported them; values are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWeatherData {
    /// Which provider answered, for diagnostics
    pub provider: String,
    pub temperature_unit: Option<String>,
    pub wind_speed_unit: Option<String>,
    pub snowfall_unit: Option<String>,
    pub current: RawCurrent,
    pub daily: Vec<RawDay>,
}

/// Abstraction over upstream weather providers, keyed by coordinates
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, location: &Coordinates) -> Result<RawWeatherData, ProviderError>;
}

/// Fetch with at most one bounded retry on transient failure.
///
/// Each underlying call is already time-bounded by the source's own
/// timeout, so the worst case here is two timeouts back to back.
pub async fn fetch_with_retry(
    source: &dyn WeatherSource,
    location: &Coordinates,
) -> Result<RawWeatherData, ProviderError> {
    match source.fetch(location).await {
        Ok(raw) => Ok(raw),
        Err(err) if err.is_transient() => {
            warn!("Weather fetch failed ({err}), retrying once");
            source.fetch(location).await
        }
        Err(err) => Err(err),
    }
}
