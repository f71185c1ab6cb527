//! Offline model artifact check

use anyhow::{Context, Result};
use colored::Colorize;
use pricer_lib::predictor::{result_line, FileSource};
use pricer_lib::{FeatureRecord, Predictor, PricingModel};
use serde_json::json;
use std::path::Path;

use crate::output::{print_info, print_json, print_success, OutputFormat};

/// Load an artifact with the server's loader and price the default record
pub fn check_model(path: &Path, format: OutputFormat) -> Result<()> {
    let source = FileSource::new(path);
    let model = PricingModel::load(&source)
        .with_context(|| format!("Model artifact {} is not usable", path.display()))?;

    let estimate = model
        .predict(&FeatureRecord::default())
        .context("Model loaded but failed to price the default record")?;

    match format {
        OutputFormat::Json => {
            print_json(&json!({
                "path": path.display().to_string(),
                "model_version": model.model_version(),
                "estimator": model.estimator_kind(),
                "inputs": model.input_width(),
                "default_price": estimate.price,
            }))?;
        }
        OutputFormat::Table => {
            print_success(&format!("Model artifact {} loaded", path.display()));
            print_info(&format!("Version:   {}", model.model_version().cyan()));
            print_info(&format!("Estimator: {}", model.estimator_kind()));
            print_info(&format!("Inputs:    {}", model.input_width()));
            println!();
            println!("Default record -> {}", result_line(estimate.price).green().bold());
        }
    }

    Ok(())
}
