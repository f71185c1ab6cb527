//! ML prediction engine

mod artifact;
mod cache;
mod features;
mod inference;
mod output;
#[cfg(test)]
pub(crate) mod testing;

pub use artifact::{
    sha256_hex, verify_checksum, ArtifactManifest, ArtifactSource, Encoding, EstimatorSpec,
    FeatureSpec, FileSource, SchemaRef, TargetTransform, DEFAULT_ARTIFACT_PATH,
};
pub use cache::ModelCache;
pub use features::FeatureEncoder;
pub use inference::{Estimator, LinearEstimator, OnnxEstimator, PricingModel};
pub use output::{format_price, result_line, RESULT_PREFIX};

use crate::error::PredictionError;
use crate::models::{FeatureRecord, PriceEstimate};

/// Trait for prediction implementations
pub trait Predictor: Send + Sync {
    /// Estimate the market price for one record
    fn predict(&self, record: &FeatureRecord) -> Result<PriceEstimate, PredictionError>;

    /// Version of the model backing the predictions
    fn model_version(&self) -> &str;
}
