//! Car Price Estimator CLI
//!
//! A command-line tool for requesting price estimates, inspecting the
//! form schema, and checking model artifacts before deployment.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{health, model, predict, schema};
use pricer_lib::{
    BodyType, Brand, Condition, Doors, DriveType, FeatureRecord, FuelType, RegistrationStatus,
    Seats, Transmission, YesNo,
};
use std::path::PathBuf;

/// Car Price Estimator CLI
#[derive(Parser)]
#[command(name = "carprice")]
#[command(author, version, about = "CLI for the Car Price Estimator", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via CARPRICE_API_URL env var)
    #[arg(long, env = "CARPRICE_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the market price of a car
    Predict(PredictArgs),

    /// Show the form controls and their domains
    Schema,

    /// Load a model artifact locally and run one prediction on the defaults
    CheckModel {
        /// Path to the artifact manifest
        path: PathBuf,
    },

    /// Show service health
    Health,
}

/// Car details; anything not given keeps the form default
#[derive(Args)]
pub struct PredictArgs {
    #[arg(long, default_value_t = Brand::default())]
    pub brand: Brand,

    #[arg(long, default_value_t = Condition::default())]
    pub condition: Condition,

    #[arg(long, default_value_t = FuelType::default())]
    pub fuel_type: FuelType,

    #[arg(long, default_value_t = Transmission::default())]
    pub transmission: Transmission,

    #[arg(long, default_value_t = DriveType::default())]
    pub drive_type: DriveType,

    #[arg(long, default_value_t = BodyType::default())]
    pub body_type: BodyType,

    #[arg(long, default_value_t = YesNo::default())]
    pub accident_history: YesNo,

    #[arg(long, default_value_t = YesNo::default())]
    pub insurance: YesNo,

    #[arg(long, default_value_t = RegistrationStatus::default())]
    pub registration_status: RegistrationStatus,

    /// Years, 0-30
    #[arg(long, default_value_t = FeatureRecord::default().car_age)]
    pub car_age: u32,

    /// Kilometres driven
    #[arg(long, default_value_t = FeatureRecord::default().mileage_km)]
    pub mileage: u64,

    /// Litres, 0.8-6.0
    #[arg(long, default_value_t = FeatureRecord::default().engine_size_l)]
    pub engine_size: f64,

    /// 50-1000
    #[arg(long, default_value_t = FeatureRecord::default().horsepower)]
    pub horsepower: u32,

    /// 50-1500
    #[arg(long, default_value_t = FeatureRecord::default().torque)]
    pub torque: u32,

    #[arg(long, default_value_t = Doors::default())]
    pub doors: Doors,

    #[arg(long, default_value_t = Seats::default())]
    pub seats: Seats,

    /// L/100km, 2.0-20.0
    #[arg(long, default_value_t = FeatureRecord::default().fuel_efficiency)]
    pub fuel_efficiency: f64,
}

impl From<PredictArgs> for FeatureRecord {
    fn from(args: PredictArgs) -> Self {
        FeatureRecord {
            brand: args.brand,
            condition: args.condition,
            fuel_type: args.fuel_type,
            transmission: args.transmission,
            drive_type: args.drive_type,
            body_type: args.body_type,
            accident_history: args.accident_history,
            insurance: args.insurance,
            registration_status: args.registration_status,
            car_age: args.car_age,
            mileage_km: args.mileage,
            engine_size_l: args.engine_size,
            horsepower: args.horsepower,
            torque: args.torque,
            doors: args.doors,
            seats: args.seats,
            fuel_efficiency: args.fuel_efficiency,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Checking an artifact never talks to the API
    if let Commands::CheckModel { path } = &cli.command {
        return model::check_model(path, cli.format);
    }

    let settings = config::Config::load()?;
    let api_url = config::resolve_api_url(cli.api_url, &settings);
    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Predict(args) => {
            predict::predict(&client, FeatureRecord::from(args), cli.format).await?;
        }
        Commands::Schema => {
            schema::show_schema(&client, cli.format).await?;
        }
        Commands::Health => {
            health::show_health(&client, cli.format).await?;
        }
        Commands::CheckModel { .. } => {}
    }

    Ok(())
}
