//! Feature encoding for model inference
//!
//! Turns a Feature Record into the flat numeric input vector the estimator
//! was trained on. The encoder is built from the artifact's feature list and
//! validates it against the record schema, so a field-name or label mismatch
//! fails at load time instead of silently mispredicting.

use super::artifact::{Encoding, FeatureSpec};
use crate::error::ArtifactError;
use crate::models::{field_index, FeatureRecord, FieldKind, FIELDS, FIELD_COUNT};

#[derive(Debug, Clone, PartialEq)]
enum Column {
    OneHot { categories: Vec<String> },
    Scaled { mean: f64, scale: f64 },
}

#[derive(Debug, Clone, PartialEq)]
struct ColumnEncoder {
    field: usize,
    column: Column,
}

impl ColumnEncoder {
    fn width(&self) -> usize {
        match &self.column {
            Column::OneHot { categories } => categories.len(),
            Column::Scaled { .. } => 1,
        }
    }
}

/// Encodes Feature Records into estimator inputs
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    columns: Vec<ColumnEncoder>,
    width: usize,
}

impl FeatureEncoder {
    /// Build an encoder from the artifact's feature list
    ///
    /// The list must name every record field exactly once. One-hot encoders
    /// must cover every label the input controls can produce; scaling encoders
    /// are only valid on numeric fields.
    pub fn from_specs(specs: &[FeatureSpec]) -> Result<Self, ArtifactError> {
        let mut seen = [false; FIELD_COUNT];
        let mut columns = Vec::with_capacity(specs.len());

        for spec in specs {
            let field = field_index(&spec.name).ok_or_else(|| {
                ArtifactError::mismatch(&spec.name, "not a field of the feature record")
            })?;
            if seen[field] {
                return Err(ArtifactError::mismatch(&spec.name, "listed more than once"));
            }
            seen[field] = true;

            let kind = FIELDS[field].kind;
            let column = match &spec.encoding {
                Encoding::OneHot { categories } => {
                    let labels = kind.labels().ok_or_else(|| {
                        ArtifactError::mismatch(&spec.name, "one-hot encoding on a numeric field")
                    })?;
                    if let Some(missing) = labels.iter().find(|l| !categories.iter().any(|c| c.as_str() == **l)) {
                        return Err(ArtifactError::mismatch(
                            &spec.name,
                            format!("category '{}' is not known to the model", missing),
                        ));
                    }
                    Column::OneHot {
                        categories: categories.clone(),
                    }
                }
                Encoding::Standard { mean, scale } => {
                    Self::require_numeric(&spec.name, kind)?;
                    if !mean.is_finite() || !scale.is_finite() || *scale == 0.0 {
                        return Err(ArtifactError::mismatch(
                            &spec.name,
                            format!("invalid scaling (mean {}, scale {})", mean, scale),
                        ));
                    }
                    Column::Scaled {
                        mean: *mean,
                        scale: *scale,
                    }
                }
                Encoding::Passthrough => {
                    Self::require_numeric(&spec.name, kind)?;
                    Column::Scaled {
                        mean: 0.0,
                        scale: 1.0,
                    }
                }
            };
            columns.push(ColumnEncoder { field, column });
        }

        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(ArtifactError::mismatch(
                FIELDS[missing].name,
                "expected by the feature record but missing from the artifact",
            ));
        }

        let width = columns.iter().map(ColumnEncoder::width).sum();
        Ok(Self { columns, width })
    }

    fn require_numeric(name: &str, kind: FieldKind) -> Result<(), ArtifactError> {
        if kind.is_numeric() {
            Ok(())
        } else {
            Err(ArtifactError::mismatch(name, "numeric encoding on a categorical field"))
        }
    }

    /// Total number of model inputs
    pub fn width(&self) -> usize {
        self.width
    }

    /// Encode a record, in artifact column order
    pub fn encode(&self, record: &FeatureRecord) -> Vec<f64> {
        let values = record.values();
        let mut out = Vec::with_capacity(self.width);

        for encoder in &self.columns {
            let value = values[encoder.field].1;
            match &encoder.column {
                Column::OneHot { categories } => {
                    let label = value.label().unwrap_or_default();
                    out.extend(categories.iter().map(|c| if c == label { 1.0 } else { 0.0 }));
                }
                Column::Scaled { mean, scale } => {
                    let x = value.as_f64().unwrap_or_default();
                    out.push((x - mean) / scale);
                }
            }
        }
        out
    }
}
