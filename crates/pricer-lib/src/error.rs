//! Error types for artifact loading, prediction and form input

use std::path::PathBuf;
use thiserror::Error;

/// Failures while acquiring or validating the model artifact
///
/// Every variant is terminal for the load attempt; nothing here is retried.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact is not a valid manifest: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("artifact was trained against schema {found}, this build emits {expected}")]
    SchemaVersion { found: String, expected: String },

    #[error("schema mismatch on field '{field}': {reason}")]
    SchemaMismatch { field: String, reason: String },

    #[error("estimator expects {expected} inputs but the feature encoders produce {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to build ONNX graph {}: {reason}", path.display())]
    Onnx { path: PathBuf, reason: String },

    #[error("model load did not complete: {0}")]
    Interrupted(String),
}

impl ArtifactError {
    pub(crate) fn mismatch(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ArtifactError::SchemaMismatch {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failures of a single predict call
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("model produced a non-finite estimate ({0})")]
    NonFinite(f64),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model artifact unavailable: {0}")]
    Unavailable(#[from] ArtifactError),
}

/// Rejected form submissions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("'{value}' is not an option for {field}")]
    UnknownOption { field: &'static str, value: String },

    #[error("'{value}' is not a valid number for {field}")]
    InvalidNumber { field: &'static str, value: String },
}
