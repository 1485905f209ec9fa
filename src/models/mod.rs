//! Data models for the `SkiWeather` application
//!
//! This module contains the presentation-ready weather models:
//! - Weather: current conditions snapshot and condition labels
//! - Forecast: ordered multi-day forecast

pub mod forecast;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{Forecast, ForecastEntry};
pub use weather::{CurrentWeather, WeatherCondition};
