//! Price estimate command

use anyhow::Result;
use colored::Colorize;
use pricer_lib::FeatureRecord;
use serde_json::json;
use tabled::Tabled;

use crate::client::{ApiClient, PredictResponse};
use crate::output::{format_timestamp, print_json, print_table, OutputFormat};

/// Row for the submitted feature table
#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn feature_rows(record: &FeatureRecord) -> Vec<FeatureRow> {
    record
        .values()
        .iter()
        .map(|(name, value)| FeatureRow {
            field: name.to_string(),
            value: value.to_string(),
        })
        .collect()
}

/// Request an estimate for one car
pub async fn predict(client: &ApiClient, record: FeatureRecord, format: OutputFormat) -> Result<()> {
    let response: PredictResponse = client.post("api/predict", &record).await?;

    match format {
        OutputFormat::Json => {
            print_json(&json!({
                "record": record,
                "estimate": response,
            }))?;
        }
        OutputFormat::Table => {
            print_table(feature_rows(&record));
            println!();
            println!("{}", response.display.green().bold());
            println!(
                "Model: {}  Generated: {}",
                response.model_version.cyan(),
                format_timestamp(response.generated_at)
            );
        }
    }

    Ok(())
}
