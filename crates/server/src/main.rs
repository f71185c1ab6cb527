//! Car price estimator - form page and prediction API
//!
//! Loads the model artifact once, then serves the form, the JSON API,
//! health checks and metrics until interrupted.

use anyhow::{Context, Result};
use car_pricer::{
    api,
    config::{LogFormat, PricerConfig},
};
use pricer_lib::{
    health::{components, HealthRegistry},
    ModelCache, PricerMetrics, StructuredLogger,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let config = PricerConfig::load()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init(),
    }

    info!(listen_addr = %config.listen_addr(), model_path = %config.model_path.display(), "Car pricer configured");

    let health_registry = HealthRegistry::new();
    health_registry.register(components::HTTP).await;
    health_registry.register(components::MODEL).await;

    let metrics = PricerMetrics::new();
    let logger = StructuredLogger::new(config.listen_addr());
    let cache = Arc::new(ModelCache::from_path(&config.model_path).with_metrics(metrics.clone()));
    logger.log_startup(SERVICE_VERSION, &cache.location());

    let state = Arc::new(api::AppState::new(
        cache,
        health_registry.clone(),
        metrics,
        logger.clone(),
    ));

    if config.eager_load {
        state
            .model()
            .await
            .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;
    } else {
        warn!("Model will be loaded on the first prediction");
    }

    let shutdown_logger = logger.clone();
    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        shutdown_logger.log_shutdown("SIGINT received");
    };

    api::serve(&config.listen_addr(), state, shutdown).await?;
    info!("Shutting down");

    Ok(())
}
