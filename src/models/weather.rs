//! Current weather model and condition labels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert a WMO weather code to a condition label.
    /// See: <https://open-meteo.com/en/docs#weathervariables>
    ///
    /// Returns `None` for codes outside the WMO table so the aggregator
    /// can reject the payload instead of labeling it arbitrarily.
    #[must_use]
    pub fn from_wmo_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Clear),
            1..=2 => Some(Self::PartlyCloudy),
            3 => Some(Self::Cloudy),
            45 | 48 => Some(Self::Fog),
            51 | 53 | 55 => Some(Self::Drizzle),
            56 | 57 | 66 | 67 => Some(Self::Sleet),
            61 | 63 | 80 => Some(Self::Rain),
            65 | 81 | 82 => Some(Self::HeavyRain),
            71 | 73 | 75 | 77 | 85 | 86 => Some(Self::Snow),
            95 | 96 | 99 => Some(Self::Thunderstorm),
            _ => None,
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }
}

/// Current weather snapshot in canonical units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Temperature in Celsius
    pub temperature_c: f64,
    pub condition: WeatherCondition,
    /// Wind speed in m/s
    pub wind_speed_ms: f64,
    /// When the upstream provider observed these conditions
    pub observed_at: DateTime<Utc>,
}

impl CurrentWeather {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature_c)
    }

    /// Format wind speed with unit
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} m/s", self.wind_speed_ms)
    }
}
