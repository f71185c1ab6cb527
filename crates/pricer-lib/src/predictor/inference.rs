//! Estimators and the loaded pricing model
//!
//! Linear estimators are evaluated directly; ONNX graphs exported from the
//! training pipeline run through tract.

use super::artifact::{verify_checksum, ArtifactManifest, ArtifactSource, EstimatorSpec, TargetTransform};
use super::features::FeatureEncoder;
use super::Predictor;
use crate::error::{ArtifactError, PredictionError};
use crate::models::{FeatureRecord, PriceEstimate};
use std::path::PathBuf;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
const SLOW_INFERENCE_MS: u128 = 50;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Maps an encoded feature vector to a raw model output
pub trait Estimator: Send + Sync {
    fn estimate(&self, inputs: &[f64]) -> Result<f64, PredictionError>;

    /// Number of inputs the estimator expects
    fn width(&self) -> usize;

    fn kind(&self) -> &'static str;
}

/// `intercept + Σ coefficient · input`
#[derive(Debug, Clone)]
pub struct LinearEstimator {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearEstimator {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }
}

impl Estimator for LinearEstimator {
    fn estimate(&self, inputs: &[f64]) -> Result<f64, PredictionError> {
        if inputs.len() != self.coefficients.len() {
            return Err(PredictionError::Inference(format!(
                "expected {} inputs, got {}",
                self.coefficients.len(),
                inputs.len()
            )));
        }
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(inputs)
            .map(|(c, x)| c * x)
            .sum();
        Ok(self.intercept + dot)
    }

    fn width(&self) -> usize {
        self.coefficients.len()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// ONNX graph taking one `f32[1, width]` input
pub struct OnnxEstimator {
    plan: TractModel,
    width: usize,
}

impl OnnxEstimator {
    /// Parse and optimize an ONNX graph for a fixed input width
    pub fn from_bytes(graph: &[u8], width: usize) -> TractResult<Self> {
        let plan = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(graph))?
            .with_input_fact(0, f32::fact([1, width]).into())?
            .into_optimized()?
            .into_runnable()?;
        Ok(Self { plan, width })
    }
}

impl Estimator for OnnxEstimator {
    fn estimate(&self, inputs: &[f64]) -> Result<f64, PredictionError> {
        let data: Vec<f32> = inputs.iter().map(|x| *x as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.width), data)
            .map_err(|e| PredictionError::Inference(e.to_string()))?
            .into();

        let result = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;
        let output = result
            .first()
            .ok_or_else(|| PredictionError::Inference("no output from model".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;
        view.iter()
            .next()
            .map(|v| *v as f64)
            .ok_or_else(|| PredictionError::Inference("empty model output".to_string()))
    }

    fn width(&self) -> usize {
        self.width
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}

/// A loaded, validated model artifact
///
/// Immutable after construction; shared read-only across requests.
pub struct PricingModel {
    model_version: String,
    encoder: FeatureEncoder,
    estimator: Box<dyn Estimator>,
    transform: TargetTransform,
}

impl std::fmt::Debug for PricingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricingModel")
            .field("model_version", &self.model_version)
            .field("estimator", &self.estimator.kind())
            .field("width", &self.encoder.width())
            .field("transform", &self.transform)
            .finish()
    }
}

impl PricingModel {
    /// Read, validate and build the model from an artifact source
    pub fn load(source: &dyn ArtifactSource) -> Result<Self, ArtifactError> {
        let bytes = source.read_manifest()?;
        let manifest = ArtifactManifest::from_slice(&bytes)?;
        Self::from_manifest(manifest, source)
    }

    /// Build from an already parsed manifest; sibling files come from `source`
    pub fn from_manifest(
        manifest: ArtifactManifest,
        source: &dyn ArtifactSource,
    ) -> Result<Self, ArtifactError> {
        let encoder = FeatureEncoder::from_specs(&manifest.features)?;

        let estimator: Box<dyn Estimator> = match manifest.estimator {
            EstimatorSpec::Linear {
                intercept,
                coefficients,
            } => {
                if coefficients.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
                    return Err(ArtifactError::mismatch("estimator", "non-finite coefficient"));
                }
                Box::new(LinearEstimator::new(intercept, coefficients))
            }
            EstimatorSpec::Onnx { graph, sha256 } => {
                let path = PathBuf::from(&graph);
                let bytes = source.read_sibling(&graph)?;
                if let Some(expected) = sha256.as_deref() {
                    verify_checksum(&path, &bytes, expected)?;
                }
                let estimator =
                    OnnxEstimator::from_bytes(&bytes, encoder.width()).map_err(|e| ArtifactError::Onnx {
                        path,
                        reason: format!("{:#}", e),
                    })?;
                Box::new(estimator)
            }
        };

        if estimator.width() != encoder.width() {
            return Err(ArtifactError::WidthMismatch {
                expected: estimator.width(),
                actual: encoder.width(),
            });
        }

        Ok(Self {
            model_version: manifest.model_version,
            encoder,
            estimator,
            transform: manifest.target_transform,
        })
    }

    pub fn estimator_kind(&self) -> &'static str {
        self.estimator.kind()
    }

    /// Number of encoded model inputs
    pub fn input_width(&self) -> usize {
        self.encoder.width()
    }
}

impl Predictor for PricingModel {
    fn predict(&self, record: &FeatureRecord) -> Result<PriceEstimate, PredictionError> {
        let start = Instant::now();

        let inputs = self.encoder.encode(record);
        let raw = self.estimator.estimate(&inputs)?;
        let price = self.transform.apply(raw);
        if !price.is_finite() {
            return Err(PredictionError::NonFinite(price));
        }

        let elapsed = start.elapsed();
        if elapsed.as_millis() > SLOW_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms", SLOW_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), price, "Inference completed");
        }

        Ok(PriceEstimate {
            price,
            model_version: self.model_version.clone(),
            generated_at: chrono::Utc::now().timestamp(),
        })
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Brand;
    use crate::predictor::artifact::{sha256_hex, FileSource};
    use crate::predictor::testing::{linear_manifest, MemorySource};

    /// MatMul + Add over the same weights as `linear_manifest`
    const PRICE_GRAPH: &[u8] = include_bytes!("../../testdata/price_linear.onnx");

    fn onnx_manifest() -> ArtifactManifest {
        let mut manifest = linear_manifest();
        manifest.model_version = "test-ridge-onnx".to_string();
        manifest.estimator = EstimatorSpec::Onnx {
            graph: "price_linear.onnx".to_string(),
            sha256: Some(sha256_hex(PRICE_GRAPH)),
        };
        manifest
    }

    #[test]
    fn test_linear_estimator() {
        let estimator = LinearEstimator::new(10.0, vec![1.0, -2.0]);
        assert_eq!(estimator.estimate(&[3.0, 1.0]).unwrap(), 11.0);
        assert!(estimator.estimate(&[1.0]).is_err());
        assert_eq!(estimator.kind(), "linear");
    }

    #[test]
    fn test_load_from_source() {
        let source = MemorySource::new(&linear_manifest());
        let model = PricingModel::load(&source).unwrap();
        assert_eq!(model.estimator_kind(), "linear");
        assert_eq!(model.model_version(), "test-ridge");
        assert_eq!(model.input_width(), 37);
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let mut manifest = linear_manifest();
        manifest.estimator = EstimatorSpec::Linear {
            intercept: 0.0,
            coefficients: vec![1.0; 5],
        };
        let err = PricingModel::from_manifest(manifest, &MemorySource::empty()).unwrap_err();
        assert!(matches!(err, ArtifactError::WidthMismatch { expected: 5, actual: 37 }));
    }

    #[test]
    fn test_onnx_graph_checksum_checked_before_parsing() {
        let mut manifest = linear_manifest();
        manifest.estimator = EstimatorSpec::Onnx {
            graph: "price.onnx".to_string(),
            sha256: Some("00".repeat(32)),
        };
        let source = MemorySource::empty().with_sibling("price.onnx", b"not a graph");
        let err = PricingModel::from_manifest(manifest, &source).unwrap_err();
        assert!(matches!(err, ArtifactError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_onnx_garbage_graph_is_a_load_failure() {
        let mut manifest = linear_manifest();
        manifest.estimator = EstimatorSpec::Onnx {
            graph: "price.onnx".to_string(),
            sha256: None,
        };
        let source = MemorySource::empty().with_sibling("price.onnx", b"not a graph");
        let err = PricingModel::from_manifest(manifest, &source).unwrap_err();
        assert!(matches!(err, ArtifactError::Onnx { .. }));
    }

    #[test]
    fn test_onnx_graph_agrees_with_linear_estimator() {
        let linear = PricingModel::from_manifest(linear_manifest(), &MemorySource::empty()).unwrap();
        let source = MemorySource::empty().with_sibling("price_linear.onnx", PRICE_GRAPH);
        let onnx = PricingModel::from_manifest(onnx_manifest(), &source).unwrap();

        assert_eq!(onnx.estimator_kind(), "onnx");
        assert_eq!(onnx.input_width(), 37);

        let records = [
            FeatureRecord::default(),
            FeatureRecord {
                brand: Brand::Bmw,
                car_age: 12,
                mileage_km: 180_000,
                horsepower: 300,
                ..FeatureRecord::default()
            },
        ];
        for record in &records {
            let expected = linear.predict(record).unwrap().price;
            let estimate = onnx.predict(record).unwrap();
            assert!(
                (estimate.price - expected).abs() < 0.05,
                "onnx {} vs linear {}",
                estimate.price,
                expected
            );
            assert_eq!(estimate.model_version, "test-ridge-onnx");
        }
    }

    #[test]
    fn test_onnx_graph_loads_from_manifest_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let manifest_path = dir.path().join("car_price_pipeline.json");
        std::fs::write(&manifest_path, serde_json::to_vec(&onnx_manifest()).unwrap()).unwrap();
        std::fs::write(dir.path().join("price_linear.onnx"), PRICE_GRAPH).unwrap();

        let model = PricingModel::load(&FileSource::new(&manifest_path)).unwrap();
        let estimate = model.predict(&FeatureRecord::default()).unwrap();
        assert!((estimate.price - 27578.18).abs() < 0.05, "got {}", estimate.price);
    }

    #[test]
    fn test_exp_transform_and_non_finite_output() {
        let mut manifest = linear_manifest();
        manifest.target_transform = TargetTransform::Exp;
        let model = PricingModel::from_manifest(manifest.clone(), &MemorySource::empty()).unwrap();
        // exp of a price-sized raw value overflows
        let err = model.predict(&FeatureRecord::default()).unwrap_err();
        assert!(matches!(err, PredictionError::NonFinite(_)));

        manifest.estimator = EstimatorSpec::Linear {
            intercept: 10.0,
            coefficients: vec![0.0; 37],
        };
        let model = PricingModel::from_manifest(manifest, &MemorySource::empty()).unwrap();
        let estimate = model.predict(&FeatureRecord::default()).unwrap();
        assert!((estimate.price - 10f64.exp()).abs() < 1e-6);
    }
}
