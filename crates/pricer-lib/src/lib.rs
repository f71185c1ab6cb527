//! Core library for the car price estimator
//!
//! This crate provides:
//! - The Feature Record and its `car-features` schema
//! - The input form: controls, domains, defaults and current values
//! - Model artifact loading (once per process) and price prediction
//! - The trigger session that decides what the result region shows
//! - Health checks and observability

pub mod error;
pub mod form;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod session;

pub use error::{ArtifactError, FormError, PredictionError};
pub use form::{Control, ControlKind, FormState, Section, CONTROLS};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{PricerMetrics, StructuredLogger};
pub use predictor::{ModelCache, Predictor, PricingModel};
pub use session::{DisplayState, Session};
