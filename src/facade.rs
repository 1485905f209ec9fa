//! Query facade
//!
//! The single entry point the web layer calls. One invocation walks
//! resolve → fetch → aggregate in order and always returns exactly one
//! [`Outcome`]; no error crosses this boundary any other way.

use crate::aggregate::{AggregationError, Aggregator};
use crate::catalog::{ResortCatalog, ResortRecord};
use crate::models::{CurrentWeather, Forecast};
use crate::resolver::ResortResolver;
use crate::snow::SnowAnalysis;
use crate::weather::{ProviderError, WeatherSource, fetch_with_retry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Presentation-ready result for a successful query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub resort: ResortRecord,
    pub current: CurrentWeather,
    pub forecast: Forecast,
    pub snow: SnowAnalysis,
    /// Which provider supplied the data, for diagnostics
    pub provider: String,
}

/// Everything a query can end in. The web layer renders exactly one of
/// these per form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(WeatherResult),
    /// No catalog entry matched; carries the original query text
    NotFound { query: String },
    ProviderFailure(ProviderError),
    AggregationFailure(AggregationError),
}

impl Outcome {
    /// User-facing message for the two failure families. `NotFound` covers
    /// empty input as well; the UI shows one generic message for both.
    #[must_use]
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::NotFound { .. } => {
                Some("Ski resort not found. Please try another location.")
            }
            Outcome::ProviderFailure(_) | Outcome::AggregationFailure(_) => {
                Some("Error fetching weather data. Please try again later.")
            }
        }
    }
}

/// Orchestrates resolver, weather source and aggregator for one request
pub struct WeatherQueryService {
    catalog: Arc<ResortCatalog>,
    source: Arc<dyn WeatherSource>,
}

impl WeatherQueryService {
    #[must_use]
    pub fn new(catalog: Arc<ResortCatalog>, source: Arc<dyn WeatherSource>) -> Self {
        Self { catalog, source }
    }

    /// Handle one form submission end to end
    #[instrument(skip(self))]
    pub async fn handle(&self, raw_text: &str) -> Outcome {
        let Some(resolved) = ResortResolver::resolve(&self.catalog, raw_text) else {
            debug!("No resort matched query {:?}", raw_text);
            return Outcome::NotFound {
                query: raw_text.to_string(),
            };
        };
        let record = resolved.record.clone();

        let raw = match fetch_with_retry(self.source.as_ref(), &record.location).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Weather fetch for {:?} failed: {err}", record.canonical_name);
                return Outcome::ProviderFailure(err);
            }
        };

        let (current, forecast) = match Aggregator::aggregate(&raw) {
            Ok(parts) => parts,
            Err(err) => {
                warn!(
                    "Aggregating {} data for {:?} failed: {err}",
                    raw.provider, record.canonical_name
                );
                return Outcome::AggregationFailure(err);
            }
        };

        let snow = SnowAnalysis::from_forecast(&forecast);

        Outcome::Success(WeatherResult {
            resort: record,
            current,
            forecast,
            snow,
            provider: raw.provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Coordinates;
    use crate::weather::{RawCurrent, RawDay, RawWeatherData};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that always answers the same way, counting calls
    struct FixedSource {
        result: Result<RawWeatherData, ProviderError>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(result: Result<RawWeatherData, ProviderError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WeatherSource for FixedSource {
        async fn fetch(&self, _location: &Coordinates) -> Result<RawWeatherData, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn good_raw() -> RawWeatherData {
        RawWeatherData {
            provider: "open-meteo".to_string(),
            temperature_unit: Some("°C".to_string()),
            wind_speed_unit: Some("km/h".to_string()),
            snowfall_unit: Some("cm".to_string()),
            current: RawCurrent {
                temperature: Some(-3.0),
                wind_speed: Some(10.8),
                weather_code: Some(71),
                observed_at: Some("2026-01-10T09:00".to_string()),
            },
            daily: vec![
                RawDay {
                    date: "2026-01-10".to_string(),
                    temp_max: Some(-1.0),
                    temp_min: Some(-8.0),
                    weather_code: Some(71),
                    snowfall: Some(3.0),
                },
                RawDay {
                    date: "2026-01-11".to_string(),
                    temp_max: Some(1.0),
                    temp_min: Some(-6.0),
                    weather_code: Some(2),
                    snowfall: Some(0.0),
                },
            ],
        }
    }

    fn service(source: FixedSource) -> (WeatherQueryService, Arc<FixedSource>) {
        let catalog = Arc::new(ResortCatalog::load_default().expect("valid catalog"));
        let source = Arc::new(source);
        (
            WeatherQueryService::new(catalog, source.clone()),
            source,
        )
    }

    #[tokio::test]
    async fn test_handle_success() {
        let (svc, _) = service(FixedSource::new(Ok(good_raw())));
        let outcome = svc.handle("Aspen").await;

        let Outcome::Success(result) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert!(result.resort.canonical_name.contains("Aspen"));
        assert!(!result.forecast.is_empty());
        assert!(
            result
                .forecast
                .entries
                .windows(2)
                .all(|w| w[0].date < w[1].date)
        );
        assert_eq!(result.provider, "open-meteo");
        assert_eq!(result.snow.snow_days, 1);
    }

    #[tokio::test]
    async fn test_empty_input_is_not_found_without_fetching() {
        let (svc, source) = service(FixedSource::new(Ok(good_raw())));
        for query in ["", "   "] {
            let outcome = svc.handle(query).await;
            assert!(matches!(outcome, Outcome::NotFound { .. }));
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_resort_is_not_found() {
        let (svc, source) = service(FixedSource::new(Ok(good_raw())));
        let outcome = svc.handle("NonExistentResort12345").await;
        assert_eq!(
            outcome,
            Outcome::NotFound {
                query: "NonExistentResort12345".to_string()
            }
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_timeout_becomes_provider_failure() {
        let (svc, source) = service(FixedSource::new(Err(ProviderError::Timeout)));
        let outcome = svc.handle("Zermatt").await;
        assert_eq!(outcome, Outcome::ProviderFailure(ProviderError::Timeout));
        // transient failure gets exactly one retry
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_retried() {
        let (svc, source) = service(FixedSource::new(Err(ProviderError::MalformedResponse {
            message: "bad json".to_string(),
        })));
        let outcome = svc.handle("Zermatt").await;
        assert!(matches!(
            outcome,
            Outcome::ProviderFailure(ProviderError::MalformedResponse { .. })
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unusable_data_becomes_aggregation_failure() {
        let mut raw = good_raw();
        raw.current.temperature = None;
        let (svc, _) = service(FixedSource::new(Ok(raw)));
        let outcome = svc.handle("Vail").await;
        assert!(matches!(outcome, Outcome::AggregationFailure(_)));
    }

    #[tokio::test]
    async fn test_repeated_queries_are_idempotent() {
        let (svc, _) = service(FixedSource::new(Ok(good_raw())));
        let first = svc.handle("Whistler").await;
        let second = svc.handle("Whistler").await;
        assert_eq!(first, second);
    }

    #[test]
    fn test_user_messages() {
        let not_found = Outcome::NotFound {
            query: "x".to_string(),
        };
        assert!(
            not_found
                .user_message()
                .unwrap()
                .contains("Ski resort not found")
        );

        let failure = Outcome::ProviderFailure(ProviderError::Timeout);
        assert!(
            failure
                .user_message()
                .unwrap()
                .contains("Error fetching weather data")
        );
    }
}
