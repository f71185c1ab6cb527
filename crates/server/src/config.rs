//! Server configuration

use anyhow::{Context, Result};
use pricer_lib::predictor::DEFAULT_ARTIFACT_PATH;
use serde::Deserialize;
use std::path::PathBuf;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PricerConfig {
    /// Address to bind the HTTP server to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// HTTP port for the form page, API and health/metrics
    #[serde(default = "default_port")]
    pub port: u16,

    /// Model artifact manifest
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Load the artifact at startup and exit if it is unusable
    #[serde(default = "default_eager_load")]
    pub eager_load: bool,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACT_PATH)
}

fn default_eager_load() -> bool {
    true
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl Default for PricerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            model_path: default_model_path(),
            eager_load: default_eager_load(),
            log_format: default_log_format(),
        }
    }
}

impl PricerConfig {
    /// Load from `pricer.toml` (optional), then `PRICER_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("pricer").required(false))
            .add_source(config::Environment::with_prefix("PRICER"))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
