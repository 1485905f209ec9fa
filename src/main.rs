use anyhow::Context;
use skiweather::config::{AppConfig, LoggingConfig};
use skiweather::weather::open_meteo::OpenMeteoSource;
use skiweather::{ResortCatalog, WeatherQueryService, web};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate()?;
    init_tracing(&config.logging);

    let catalog =
        Arc::new(ResortCatalog::load_default().context("failed to load resort catalog")?);
    tracing::info!("Loaded {} resorts into the catalog", catalog.len());

    let source = Arc::new(
        OpenMeteoSource::new(&config.weather).context("failed to build weather client")?,
    );
    let service = Arc::new(WeatherQueryService::new(catalog, source));

    web::run(config.server.port, service).await
}

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
