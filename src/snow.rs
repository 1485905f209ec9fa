//! Snow condition analysis
//!
//! Derives a skiing-oriented summary from the aggregated forecast: how many
//! snow days are coming, total expected snowfall and the temperature range,
//! plus a one-line verdict for the results page.

use crate::models::{Forecast, WeatherCondition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnowAnalysis {
    pub snow_days: u32,
    pub total_snow_mm: f64,
    pub lowest_temp_c: f64,
    pub highest_temp_c: f64,
    pub summary: String,
}

impl SnowAnalysis {
    /// Analyze a non-empty forecast. A day counts as a snow day when it
    /// reports snowfall or a snow condition label.
    #[must_use]
    pub fn from_forecast(forecast: &Forecast) -> Self {
        let mut snow_days = 0u32;
        let mut total_snow_mm = 0.0;
        let mut lowest_temp_c = f64::INFINITY;
        let mut highest_temp_c = f64::NEG_INFINITY;

        for entry in &forecast.entries {
            let has_snow = entry.snowfall_mm > 0.0 || entry.condition == WeatherCondition::Snow;
            if has_snow {
                snow_days += 1;
                total_snow_mm += entry.snowfall_mm;
            }
            lowest_temp_c = lowest_temp_c.min(entry.low_c);
            highest_temp_c = highest_temp_c.max(entry.high_c);
        }

        let summary = Self::summarize(snow_days, lowest_temp_c);

        Self {
            snow_days,
            total_snow_mm,
            lowest_temp_c,
            highest_temp_c,
            summary,
        }
    }

    fn summarize(snow_days: u32, lowest_temp_c: f64) -> String {
        if snow_days >= 3 {
            "Great news! Fresh powder expected with multiple snow days in the forecast."
                .to_string()
        } else if snow_days > 0 {
            format!("Some fresh snow expected with {snow_days} snow day(s) in the forecast.")
        } else if lowest_temp_c < 0.0 {
            "No fresh snow expected, but temperatures will be cold enough to preserve existing snow."
                .to_string()
        } else if lowest_temp_c < 5.0 {
            "No fresh snow expected. Cool temperatures may help maintain snow conditions."
                .to_string()
        } else {
            "No fresh snow expected and temperatures are relatively warm. Snow conditions may deteriorate."
                .to_string()
        }
    }
}
