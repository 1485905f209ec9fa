//! Web layer
//!
//! Serves the resort search form and renders query outcomes as HTML.
//! All decision logic lives behind [`WeatherQueryService`]; this module
//! only translates form submissions into facade calls and outcomes into
//! markup.

use crate::facade::{Outcome, WeatherQueryService, WeatherResult};
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

const PAGE_TITLE: &str = "Ski Resort Weather Checker";

pub async fn run(port: u16, service: Arc<WeatherQueryService>) -> anyhow::Result<()> {
    let app = router(service);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(service: Arc<WeatherQueryService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/weather", post(check_weather))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(20)))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct WeatherForm {
    #[serde(default)]
    resort: String,
}

async fn index() -> Html<String> {
    Html(render_page(None, None))
}

async fn check_weather(
    State(service): State<Arc<WeatherQueryService>>,
    Form(form): Form<WeatherForm>,
) -> Html<String> {
    let outcome = service.handle(&form.resort).await;
    let page = match &outcome {
        Outcome::Success(result) => render_page(Some(result), None),
        _ => render_page(None, outcome.user_message()),
    };
    Html(page)
}

fn render_page(weather: Option<&WeatherResult>, error: Option<&str>) -> String {
    let mut body = String::new();

    if let Some(message) = error {
        body.push_str(&format!(
            r#"<div class="error">{}</div>"#,
            escape_html(message)
        ));
    }
    if let Some(result) = weather {
        body.push_str(&render_weather(result));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{PAGE_TITLE}</title>
</head>
<body>
  <h1>{PAGE_TITLE}</h1>
  <form action="/weather" method="post">
    <input type="text" name="resort" placeholder="Enter a ski resort name" required>
    <button type="submit">Check Weather</button>
  </form>
{body}
</body>
</html>
"#
    )
}

fn render_weather(result: &WeatherResult) -> String {
    let current = &result.current;
    let mut forecast_days = String::new();
    for entry in &result.forecast.entries {
        forecast_days.push_str(&format!(
            r#"      <div class="forecast-day">
        <span class="date">{}</span>
        <span class="condition">{}</span>
        <span class="high">High {:.1}°C</span>
        <span class="low">Low {:.1}°C</span>
        <span class="snow">Snow {:.0} mm</span>
      </div>
"#,
            entry.date,
            entry.condition.label(),
            entry.high_c,
            entry.low_c,
            entry.snowfall_mm,
        ));
    }

    format!(
        r#"  <section class="weather">
    <h2>{name}</h2>
    <div class="current-weather">
      <p>{condition}, {temperature}, wind {wind}</p>
      <p class="observed-at">Observed at {observed_at}</p>
    </div>
    <div class="forecast-container">
{forecast_days}    </div>
    <div class="snow-analysis">
      <p>{summary}</p>
      <p>{snow_days} snow day(s), {total_snow:.0} mm expected, lows to {lowest:.1}°C</p>
    </div>
  </section>
"#,
        name = escape_html(&result.resort.canonical_name),
        condition = current.condition.label(),
        temperature = current.format_temperature(),
        wind = current.format_wind(),
        observed_at = current.observed_at.format("%Y-%m-%d %H:%M UTC"),
        summary = escape_html(&result.snow.summary),
        snow_days = result.snow.snow_days,
        total_snow = result.snow.total_snow_mm,
        lowest = result.snow.lowest_temp_c,
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
