//! Multi-day forecast model

use super::WeatherCondition;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of the forecast, in canonical units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    /// Daily high in Celsius
    pub high_c: f64,
    /// Daily low in Celsius
    pub low_c: f64,
    pub condition: WeatherCondition,
    /// Expected snowfall in millimeters
    pub snowfall_mm: f64,
}

/// Ordered multi-day forecast. The aggregator guarantees the entries are
/// strictly ascending by date with no duplicates, and non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub entries: Vec<ForecastEntry>,
}

impl Forecast {
    #[must_use]
    pub fn new(entries: Vec<ForecastEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
