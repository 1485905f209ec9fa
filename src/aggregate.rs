//! Weather aggregation
//!
//! Turns raw provider data into the canonical presentation model. All unit
//! normalization lives here so provider-specific units never leak into the
//! web layer: temperatures become Celsius, wind speeds m/s, snowfall mm.
//! Required fields are validated explicitly and implausible values are
//! rejected rather than rendered.

use crate::models::{CurrentWeather, Forecast, ForecastEntry, WeatherCondition};
use crate::weather::{RawDay, RawWeatherData};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

/// Physically plausible surface temperatures, in Celsius
const TEMPERATURE_RANGE_C: std::ops::RangeInclusive<f64> = -90.0..=60.0;
/// Wind speeds above this (m/s) are treated as data errors
const MAX_WIND_SPEED_MS: f64 = 150.0;

/// Aggregation failure, terminal for the request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("{field} out of plausible range")]
    OutOfRange { field: &'static str },

    #[error("unknown weather code {code}")]
    UnknownWeatherCode { code: i32 },

    #[error("invalid observation timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[error("unsupported unit: {unit}")]
    UnsupportedUnit { unit: String },

    #[error("forecast contained no usable days")]
    EmptyForecast,
}

/// Service that validates and normalizes raw provider data
pub struct Aggregator;

impl Aggregator {
    /// Aggregate raw provider data into the canonical current snapshot and
    /// forecast. Fails if the current block is unusable or no forecast day
    /// survives validation.
    pub fn aggregate(raw: &RawWeatherData) -> Result<(CurrentWeather, Forecast), AggregationError> {
        let current = Self::aggregate_current(raw)?;
        let forecast = Self::aggregate_forecast(raw)?;
        Ok((current, forecast))
    }

    fn aggregate_current(raw: &RawWeatherData) -> Result<CurrentWeather, AggregationError> {
        let temperature = raw
            .current
            .temperature
            .ok_or(AggregationError::MissingField {
                field: "temperature",
            })?;
        let temperature_c = to_celsius(temperature, raw.temperature_unit.as_deref())?;
        if !TEMPERATURE_RANGE_C.contains(&temperature_c) {
            return Err(AggregationError::OutOfRange {
                field: "temperature",
            });
        }

        let code = raw
            .current
            .weather_code
            .ok_or(AggregationError::MissingField {
                field: "weather_code",
            })?;
        let condition = WeatherCondition::from_wmo_code(code)
            .ok_or(AggregationError::UnknownWeatherCode { code })?;

        let wind_speed = raw
            .current
            .wind_speed
            .ok_or(AggregationError::MissingField { field: "wind_speed" })?;
        let wind_speed_ms = to_meters_per_second(wind_speed, raw.wind_speed_unit.as_deref())?;
        if !(0.0..=MAX_WIND_SPEED_MS).contains(&wind_speed_ms) {
            return Err(AggregationError::OutOfRange { field: "wind_speed" });
        }

        let observed_at = match raw.current.observed_at.as_deref() {
            Some(value) => {
                parse_timestamp(value).ok_or_else(|| AggregationError::InvalidTimestamp {
                    value: value.to_string(),
                })?
            }
            // Providers that omit the observation time get the receipt time
            None => Utc::now(),
        };

        Ok(CurrentWeather {
            temperature_c,
            condition,
            wind_speed_ms,
            observed_at,
        })
    }

    fn aggregate_forecast(raw: &RawWeatherData) -> Result<Forecast, AggregationError> {
        let mut entries: Vec<ForecastEntry> = raw
            .daily
            .iter()
            .filter_map(|day| match Self::aggregate_day(raw, day) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Dropping forecast day {:?}: {err}", day.date);
                    None
                }
            })
            .collect();

        // Same-day duplicates: first occurrence wins
        let mut seen = HashSet::new();
        entries.retain(|entry| seen.insert(entry.date));
        entries.sort_by_key(|entry| entry.date);

        if entries.is_empty() {
            return Err(AggregationError::EmptyForecast);
        }
        Ok(Forecast::new(entries))
    }

    fn aggregate_day(raw: &RawWeatherData, day: &RawDay) -> Result<ForecastEntry, AggregationError> {
        let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").map_err(|_| {
            AggregationError::InvalidTimestamp {
                value: day.date.clone(),
            }
        })?;

        let unit = raw.temperature_unit.as_deref();
        let high_c = to_celsius(
            day.temp_max
                .ok_or(AggregationError::MissingField { field: "temp_max" })?,
            unit,
        )?;
        let low_c = to_celsius(
            day.temp_min
                .ok_or(AggregationError::MissingField { field: "temp_min" })?,
            unit,
        )?;
        if !TEMPERATURE_RANGE_C.contains(&high_c)
            || !TEMPERATURE_RANGE_C.contains(&low_c)
            || low_c > high_c
        {
            return Err(AggregationError::OutOfRange {
                field: "temperature",
            });
        }

        let code = day
            .weather_code
            .ok_or(AggregationError::MissingField {
                field: "weather_code",
            })?;
        let condition = WeatherCondition::from_wmo_code(code)
            .ok_or(AggregationError::UnknownWeatherCode { code })?;

        // Snowfall is optional; absent means none reported
        let snowfall_mm = match day.snowfall {
            Some(value) => to_millimeters(value, raw.snowfall_unit.as_deref())?.max(0.0),
            None => 0.0,
        };

        Ok(ForecastEntry {
            date,
            high_c,
            low_c,
            condition,
            snowfall_mm,
        })
    }
}

fn to_celsius(value: f64, unit: Option<&str>) -> Result<f64, AggregationError> {
    match unit.unwrap_or("°C") {
        "°C" | "C" | "celsius" => Ok(value),
        "°F" | "F" | "fahrenheit" => Ok((value - 32.0) * 5.0 / 9.0),
        other => Err(AggregationError::UnsupportedUnit {
            unit: other.to_string(),
        }),
    }
}

fn to_meters_per_second(value: f64, unit: Option<&str>) -> Result<f64, AggregationError> {
    match unit.unwrap_or("km/h") {
        "m/s" | "ms" => Ok(value),
        "km/h" | "kmh" => Ok(value / 3.6),
        "mp/h" | "mph" => Ok(value * 0.44704),
        "kn" | "knots" => Ok(value * 0.514_444),
        other => Err(AggregationError::UnsupportedUnit {
            unit: other.to_string(),
        }),
    }
}

fn to_millimeters(value: f64, unit: Option<&str>) -> Result<f64, AggregationError> {
    match unit.unwrap_or("cm") {
        "mm" => Ok(value),
        "cm" => Ok(value * 10.0),
        "inch" | "in" => Ok(value * 25.4),
        other => Err(AggregationError::UnsupportedUnit {
            unit: other.to_string(),
        }),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // Open-Meteo returns minute-resolution timestamps without an offset
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}
