//! Observability infrastructure for the estimator
//!
//! Provides:
//! - Prometheus metrics (prediction latency, prediction counts, artifact loads, model info)
//! - Structured JSON logging events with tracing

use crate::models::FeatureRecord;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, GaugeVec, Histogram, IntCounter,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5,
];

/// Registered once per process
static GLOBAL_METRICS: OnceLock<PricerMetricsInner> = OnceLock::new();

struct PricerMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounter,
    rejected_submissions_total: IntCounter,
    artifact_loads_total: IntCounter,
    model_info: GaugeVec,
}

impl PricerMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "car_pricer_prediction_latency_seconds",
                "Time spent assembling the record and running the model",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "car_pricer_predictions_total",
                "Total number of price estimates returned"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter!(
                "car_pricer_prediction_errors_total",
                "Total number of triggers that failed to produce an estimate"
            )
            .expect("Failed to register prediction_errors_total"),

            rejected_submissions_total: register_int_counter!(
                "car_pricer_rejected_submissions_total",
                "Form submissions rejected by the input controls"
            )
            .expect("Failed to register rejected_submissions_total"),

            artifact_loads_total: register_int_counter!(
                "car_pricer_artifact_loads_total",
                "Times the model artifact was read from storage"
            )
            .expect("Failed to register artifact_loads_total"),

            model_info: register_gauge_vec!(
                "car_pricer_model_info",
                "Information about the loaded model artifact",
                &["version", "estimator"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Handle to the process-wide metrics; clones share the same counters
#[derive(Clone)]
pub struct PricerMetrics {
    _private: (),
}

impl Default for PricerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PricerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PricerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PricerMetricsInner {
        GLOBAL_METRICS.get_or_init(PricerMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn inc_rejected_submissions(&self) {
        self.inner().rejected_submissions_total.inc();
    }

    pub fn inc_artifact_loads(&self) {
        self.inner().artifact_loads_total.inc();
    }

    pub fn set_model_info(&self, version: &str, estimator: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[version, estimator])
            .set(1.0);
    }

    pub fn predictions(&self) -> u64 {
        self.inner().predictions_total.get()
    }

    pub fn artifact_loads(&self) -> u64 {
        self.inner().artifact_loads_total.get()
    }
}

/// Structured logger for estimator events
///
/// Every event carries an `event` name and the service instance so log
/// pipelines can filter on them.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_location: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            model_location = %model_location,
            "Car price estimator started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Car price estimator shutting down"
        );
    }

    pub fn log_model_loaded(&self, model_version: &str, estimator: &str, inputs: usize) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            model_version = %model_version,
            estimator = %estimator,
            inputs = inputs,
            "Model artifact ready"
        );
    }

    pub fn log_prediction(&self, record: &FeatureRecord, price: f64, model_version: &str) {
        info!(
            event = "prediction",
            instance = %self.instance,
            brand = %record.brand,
            condition = %record.condition,
            car_age = record.car_age,
            mileage_km = record.mileage_km,
            price = price,
            model_version = %model_version,
            "Price estimated"
        );
    }

    pub fn log_prediction_failed(&self, error: &str) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance,
            error = %error,
            "Prediction trigger failed"
        );
    }
}
