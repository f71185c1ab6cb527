//! Car price estimator web service
//!
//! Serves the input form, runs predictions against the process-wide model
//! cache, and exposes health checks and Prometheus metrics.

pub mod api;
pub mod config;
pub mod page;
