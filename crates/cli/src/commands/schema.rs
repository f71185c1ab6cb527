//! Form schema command

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, ControlInfo, SchemaResponse};
use crate::output::{format_domain, print_json, print_table, OutputFormat};

/// Row for the controls table
#[derive(Tabled)]
struct ControlRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Control")]
    control: String,
    #[tabled(rename = "Domain")]
    domain: String,
}

impl From<&ControlInfo> for ControlRow {
    fn from(c: &ControlInfo) -> Self {
        Self {
            field: c.field.clone(),
            label: c.label.clone(),
            section: c.section.replace('_', " "),
            control: c.control.clone(),
            domain: format_domain(c.options.as_deref(), c.min, c.max),
        }
    }
}

/// Show the controls the form page renders
pub async fn show_schema(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let schema: SchemaResponse = client.get("api/schema").await?;

    match format {
        OutputFormat::Json => print_json(&schema)?,
        OutputFormat::Table => {
            println!("{} {}", "Schema:".bold(), schema.schema.to_string().cyan());
            println!();
            print_table(schema.controls.iter().map(ControlRow::from).collect());
        }
    }

    Ok(())
}
