//! Shared fixtures for predictor tests

use super::artifact::{ArtifactManifest, ArtifactSource, Encoding, EstimatorSpec, FeatureSpec, SchemaRef, TargetTransform};
use crate::error::ArtifactError;
use crate::models::{FieldKind, FIELDS};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ridge-style coefficients per field, in schema order
fn field_weights(name: &str) -> (Encoding, Vec<f64>) {
    let standard = |mean: f64, scale: f64| Encoding::Standard { mean, scale };
    match name {
        "Brand" => (one_hot(name), vec![0.0, -500.0, -1500.0, 9000.0, 11000.0, -2500.0, -3000.0]),
        "Condition" => (one_hot(name), vec![6000.0, -4000.0, 1500.0]),
        "FuelType" => (one_hot(name), vec![0.0, 800.0, 2500.0, 5000.0]),
        "Transmission" => (one_hot(name), vec![-1200.0, 1200.0]),
        "DriveType" => (one_hot(name), vec![-800.0, 400.0, 1800.0]),
        "BodyType" => (one_hot(name), vec![0.0, 3500.0, -1500.0, 2500.0]),
        "AccidentHistory" => (one_hot(name), vec![-3500.0, 0.0]),
        "Insurance" => (one_hot(name), vec![600.0, 0.0]),
        "RegistrationStatus" => (one_hot(name), vec![900.0, -900.0]),
        "CarAge" => (standard(8.0, 5.0), vec![-4200.0]),
        "Mileage(km)" => (standard(90_000.0, 55_000.0), vec![-3800.0]),
        "EngineSize(L)" => (standard(2.4, 1.0), vec![2100.0]),
        "Horsepower" => (standard(220.0, 110.0), vec![5200.0]),
        "Torque" => (standard(300.0, 150.0), vec![1400.0]),
        "Doors" => (Encoding::Passthrough, vec![150.0]),
        "Seats" => (Encoding::Passthrough, vec![300.0]),
        "FuelEfficiency(L/100km)" => (standard(8.0, 3.0), vec![-700.0]),
        other => panic!("no fixture weights for {}", other),
    }
}

fn one_hot(name: &str) -> Encoding {
    let labels = FIELDS
        .iter()
        .find(|f| f.name == name)
        .and_then(|f| match f.kind {
            FieldKind::Categorical(labels) => Some(labels),
            _ => None,
        })
        .unwrap_or_default();
    Encoding::OneHot {
        categories: labels.iter().map(|s| s.to_string()).collect(),
    }
}

/// Linear manifest covering the full schema; predicts about $27,578.18 for
/// the default record
pub fn linear_manifest() -> ArtifactManifest {
    let mut features = Vec::new();
    let mut coefficients = Vec::new();
    for field in FIELDS.iter() {
        let (encoding, weights) = field_weights(field.name);
        features.push(FeatureSpec {
            name: field.name.to_string(),
            encoding,
        });
        coefficients.extend(weights);
    }

    ArtifactManifest {
        schema: SchemaRef::current(),
        model_version: "test-ridge".to_string(),
        target_transform: TargetTransform::Identity,
        features,
        estimator: EstimatorSpec::Linear {
            intercept: 24_000.0,
            coefficients,
        },
    }
}

/// In-memory artifact source that counts manifest reads
#[derive(Default)]
pub struct MemorySource {
    manifest: Option<Vec<u8>>,
    siblings: HashMap<String, Vec<u8>>,
    reads: AtomicU64,
}

impl MemorySource {
    pub fn new(manifest: &ArtifactManifest) -> Self {
        Self {
            manifest: Some(serde_json::to_vec(manifest).unwrap()),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_sibling(mut self, name: &str, bytes: &[u8]) -> Self {
        self.siblings.insert(name.to_string(), bytes.to_vec());
        self
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ArtifactSource for MemorySource {
    fn read_manifest(&self) -> Result<Vec<u8>, ArtifactError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.manifest.clone().ok_or_else(|| ArtifactError::NotFound {
            path: "memory://manifest".into(),
        })
    }

    fn read_sibling(&self, relative: &str) -> Result<Vec<u8>, ArtifactError> {
        self.siblings
            .get(relative)
            .cloned()
            .ok_or_else(|| ArtifactError::NotFound {
                path: relative.into(),
            })
    }

    fn location(&self) -> String {
        "memory://manifest".to_string()
    }
}
