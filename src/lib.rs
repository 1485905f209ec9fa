//! `SkiWeather` - Ski resort weather checking web service
//!
//! This library provides the core functionality behind the resort search
//! form: resolving free-text input against a resort catalog, fetching
//! weather from an upstream provider and aggregating it into a
//! presentation-ready result.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod facade;
pub mod models;
pub mod resolver;
pub mod snow;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use aggregate::{AggregationError, Aggregator};
pub use catalog::{CatalogError, Coordinates, ResortCatalog, ResortRecord};
pub use config::AppConfig;
pub use facade::{Outcome, WeatherQueryService, WeatherResult};
pub use models::{CurrentWeather, Forecast, ForecastEntry, WeatherCondition};
pub use resolver::{ResolvedResort, ResortResolver};
pub use snow::SnowAnalysis;
pub use weather::{ProviderError, RawWeatherData, WeatherSource, open_meteo::OpenMeteoSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
