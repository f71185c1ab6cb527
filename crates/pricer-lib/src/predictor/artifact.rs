//! Model artifact manifest and where it is read from
//!
//! The artifact is a JSON manifest naming the feature schema it was trained
//! against, the per-field encoders and the estimator. ONNX estimators keep
//! their graph in a sibling file referenced from the manifest.

use crate::error::ArtifactError;
use crate::models::{SCHEMA_NAME, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default artifact location, relative to the working directory
pub const DEFAULT_ARTIFACT_PATH: &str = "model/car_price_pipeline.json";

/// Reference to a named, versioned feature schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    pub name: String,
    pub version: u32,
}

impl SchemaRef {
    /// The schema this build emits
    pub fn current() -> Self {
        Self {
            name: SCHEMA_NAME.to_string(),
            version: SCHEMA_VERSION,
        }
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// Encoding applied to one record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    OneHot { categories: Vec<String> },
    Standard { mean: f64, scale: f64 },
    Passthrough,
}

/// One model input column group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub encoding: Encoding,
}

/// Estimator stored in the artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorSpec {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    Onnx {
        graph: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
    },
}

/// Transform applied to the raw estimator output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTransform {
    #[default]
    Identity,
    /// Estimator was fit on log-price
    Exp,
}

impl TargetTransform {
    pub fn apply(&self, raw: f64) -> f64 {
        match self {
            TargetTransform::Identity => raw,
            TargetTransform::Exp => raw.exp(),
        }
    }
}

/// Parsed artifact manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub schema: SchemaRef,
    pub model_version: String,
    #[serde(default)]
    pub target_transform: TargetTransform,
    pub features: Vec<FeatureSpec>,
    pub estimator: EstimatorSpec,
}

impl ArtifactManifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let manifest: ArtifactManifest = serde_json::from_slice(bytes)?;
        manifest.check_schema()?;
        Ok(manifest)
    }

    /// Reject artifacts trained against another schema before looking at fields
    fn check_schema(&self) -> Result<(), ArtifactError> {
        let expected = SchemaRef::current();
        if self.schema != expected {
            return Err(ArtifactError::SchemaVersion {
                found: self.schema.to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(())
    }
}

/// Where artifact bytes come from
pub trait ArtifactSource: Send + Sync {
    /// Read the manifest document
    fn read_manifest(&self) -> Result<Vec<u8>, ArtifactError>;

    /// Read a file referenced from the manifest, relative to it
    fn read_sibling(&self, relative: &str) -> Result<Vec<u8>, ArtifactError>;

    /// Human-readable location for logs
    fn location(&self) -> String;
}

/// Artifact stored on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
        debug!(path = %path.display(), "Reading model artifact file");
        std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ArtifactError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ArtifactError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_PATH)
    }
}

impl ArtifactSource for FileSource {
    fn read_manifest(&self) -> Result<Vec<u8>, ArtifactError> {
        Self::read(&self.path)
    }

    fn read_sibling(&self, relative: &str) -> Result<Vec<u8>, ArtifactError> {
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        Self::read(&base.join(relative))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Hex-encoded SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Check bytes against an expected hex checksum (case-insensitive)
pub fn verify_checksum(path: &Path, bytes: &[u8], expected: &str) -> Result<(), ArtifactError> {
    let actual = sha256_hex(bytes);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(ArtifactError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}
