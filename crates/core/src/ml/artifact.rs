//! Trained model artifact.
//!
//! The artifact is produced offline and loaded once per process. It records the
//! feature order used during training, the prediction targets, and for each
//! target a label encoder plus the weighted sub-models that vote on it.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use super::models::Classifier;
use super::preprocess::{ColumnTransformer, FeatureRow};
use super::{SubModel, SubModelError};
use crate::domain::target::{Target, UnknownTarget};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at `{0}`")]
    NotFound(PathBuf),
    #[error("could not read model artifact `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownTarget(#[from] UnknownTarget),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// One voter for a target.
pub struct EnsembleMember {
    pub id: String,
    /// Cross-validation accuracy recorded at training time.
    pub weight: f64,
    pub model: Box<dyn SubModel>,
}

impl EnsembleMember {
    pub fn new(id: impl Into<String>, weight: f64, model: impl SubModel + 'static) -> Self {
        Self { id: id.into(), weight, model: Box::new(model) }
    }
}

impl fmt::Debug for EnsembleMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnsembleMember")
            .field("id", &self.id)
            .field("weight", &self.weight)
            .finish()
    }
}

/// Label encoder and voters for one target.
#[derive(Debug)]
pub struct TargetEnsemble {
    /// Class names; the index is the internal class id.
    pub classes: Vec<String>,
    pub members: Vec<EnsembleMember>,
}

impl TargetEnsemble {
    pub fn decode(&self, class_id: usize) -> Option<&str> {
        self.classes.get(class_id).map(String::as_str)
    }
}

#[derive(Debug)]
pub struct ModelArtifact {
    pub version: String,
    pub features: Vec<String>,
    pub targets: Vec<Target>,
    ensembles: BTreeMap<Target, TargetEnsemble>,
}

impl ModelArtifact {
    pub fn new(version: impl Into<String>, features: Vec<String>) -> Self {
        Self { version: version.into(), features, targets: Vec::new(), ensembles: BTreeMap::new() }
    }

    /// Registers a target. Targets are predicted in registration order.
    pub fn with_target(
        mut self,
        target: Target,
        classes: Vec<String>,
        members: Vec<EnsembleMember>,
    ) -> Self {
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
        self.ensembles.insert(target, TargetEnsemble { classes, members });
        self
    }

    pub fn ensemble(&self, target: Target) -> Option<&TargetEnsemble> {
        self.ensembles.get(&target)
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)
            .map_err(|source| ArtifactError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ArtifactError> {
        let document: ArtifactDocument = serde_json::from_str(raw)?;
        document.into_artifact()
    }
}

/// A fitted pipeline: column preprocessing followed by a classifier.
#[derive(Debug)]
pub struct Pipeline {
    preprocessor: Arc<ColumnTransformer>,
    classifier: Classifier,
}

impl Pipeline {
    pub fn new(preprocessor: Arc<ColumnTransformer>, classifier: Classifier) -> Self {
        Self { preprocessor, classifier }
    }
}

impl SubModel for Pipeline {
    fn predict_proba(&self, row: &FeatureRow<'_>) -> Result<Vec<f64>, SubModelError> {
        let inputs = self.preprocessor.transform(row)?;
        self.classifier.predict_proba(&inputs)
    }

    fn predict_label(&self, row: &FeatureRow<'_>) -> Result<usize, SubModelError> {
        let inputs = self.preprocessor.transform(row)?;
        self.classifier.predict_label(&inputs)
    }
}

#[derive(Debug, Deserialize)]
struct ArtifactDocument {
    #[serde(default = "default_version")]
    version: String,
    features: Vec<String>,
    targets: Vec<String>,
    preprocessor: ColumnTransformer,
    ensembles: BTreeMap<String, EnsembleDocument>,
}

#[derive(Debug, Deserialize)]
struct EnsembleDocument {
    classes: Vec<String>,
    members: BTreeMap<String, MemberDocument>,
}

#[derive(Debug, Deserialize)]
struct MemberDocument {
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    preprocessor: Option<ColumnTransformer>,
    model: Classifier,
}

fn default_version() -> String {
    "unversioned".to_string()
}

impl ArtifactDocument {
    fn into_artifact(mut self) -> Result<ModelArtifact, ArtifactError> {
        if self.features.is_empty() {
            return Err(ArtifactError::Invalid("artifact lists no features".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.features.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(ArtifactError::Invalid(format!("feature `{duplicate}` is listed twice")));
        }
        if self.targets.is_empty() {
            return Err(ArtifactError::Invalid("artifact lists no targets".to_string()));
        }

        validate_columns(&self.preprocessor, &self.features)?;
        let shared = Arc::new(self.preprocessor);
        let mut artifact = ModelArtifact::new(self.version, self.features);

        for name in &self.targets {
            let target: Target = name.parse()?;
            let ensemble = self.ensembles.remove(name).ok_or_else(|| {
                ArtifactError::Invalid(format!("target `{name}` has no ensemble"))
            })?;
            if ensemble.classes.is_empty() {
                return Err(ArtifactError::Invalid(format!("target `{name}` has no classes")));
            }
            if ensemble.members.is_empty() {
                return Err(ArtifactError::Invalid(format!("target `{name}` has no sub-models")));
            }

            let mut members = Vec::with_capacity(ensemble.members.len());
            for (id, member) in ensemble.members {
                let weight = member.weight.unwrap_or(1.0);
                if !weight.is_finite() || weight < 0.0 {
                    return Err(ArtifactError::Invalid(format!(
                        "sub-model `{id}` of `{name}` has invalid weight {weight}"
                    )));
                }
                let preprocessor = match member.preprocessor {
                    Some(own) => {
                        validate_columns(&own, &artifact.features)?;
                        Arc::new(own)
                    }
                    None => Arc::clone(&shared),
                };
                members.push(EnsembleMember::new(
                    id,
                    weight,
                    Pipeline::new(preprocessor, member.model),
                ));
            }

            artifact = artifact.with_target(target, ensemble.classes, members);
        }

        Ok(artifact)
    }
}

fn validate_columns(
    preprocessor: &ColumnTransformer,
    features: &[String],
) -> Result<(), ArtifactError> {
    if preprocessor.columns.is_empty() {
        return Err(ArtifactError::Invalid("preprocessor has no columns".to_string()));
    }
    for column in &preprocessor.columns {
        if !features.iter().any(|feature| feature == column.name()) {
            return Err(ArtifactError::Invalid(format!(
                "preprocessor column `{}` is not an artifact feature",
                column.name()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Small two-target artifact used across the crate's tests.
    pub const TINY_ARTIFACT: &str = r#"{
        "version": "test-1",
        "features": ["Soil_Type", "Nitrogen", "pH"],
        "targets": ["N_Status", "Primary_Fertilizer"],
        "preprocessor": {
            "columns": [
                {"kind": "categorical", "name": "Soil_Type", "categories": ["Loamy", "Sandy"]},
                {"kind": "numeric", "name": "Nitrogen"},
                {"kind": "numeric", "name": "pH", "fill": 6.5}
            ]
        },
        "ensembles": {
            "N_Status": {
                "classes": ["high", "low", "optimal"],
                "members": {
                    "rf": {
                        "weight": 0.9,
                        "model": {
                            "kind": "decision_tree",
                            "nodes": [
                                {"type": "split", "feature": 2, "threshold": 30.0, "left": 1, "right": 2},
                                {"type": "leaf", "value": [0.0, 8.0, 2.0]},
                                {"type": "split", "feature": 2, "threshold": 80.0, "left": 3, "right": 4},
                                {"type": "leaf", "value": [1.0, 1.0, 8.0]},
                                {"type": "leaf", "value": [9.0, 0.0, 1.0]}
                            ]
                        }
                    },
                    "svc": {
                        "weight": 0.6,
                        "model": {
                            "kind": "linear_svc",
                            "coefficients": [[0, 0, 0.05, 0], [0, 0, -0.05, 0], [0, 0, 0, 0]],
                            "intercepts": [-4.0, 1.5, 0.0]
                        }
                    }
                }
            },
            "Primary_Fertilizer": {
                "classes": ["DAP", "MOP", "Urea"],
                "members": {
                    "logit": {
                        "model": {
                            "kind": "logistic",
                            "coefficients": [[0.5, 0, 0, 0], [0, 0.5, 0, 0], [0, 0, -0.1, 0]],
                            "intercepts": [0.0, 0.0, 4.0]
                        }
                    }
                }
            }
        }
    }"#;
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::fixtures::TINY_ARTIFACT;
    use super::{ArtifactError, ModelArtifact};
    use crate::domain::target::Target;

    #[test]
    fn loads_tiny_artifact() {
        let artifact = ModelArtifact::from_json(TINY_ARTIFACT).expect("artifact");

        assert_eq!(artifact.version, "test-1");
        assert_eq!(artifact.targets, vec![Target::NStatus, Target::PrimaryFertilizer]);
        let ensemble = artifact.ensemble(Target::NStatus).expect("ensemble");
        assert_eq!(ensemble.members.len(), 2);
        assert_eq!(ensemble.decode(1), Some("low"));
        assert_eq!(ensemble.decode(3), None);
        let primary = artifact.ensemble(Target::PrimaryFertilizer).expect("ensemble");
        assert_eq!(primary.members[0].weight, 1.0);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        let error = ModelArtifact::load(&dir.path().join("absent.json")).expect_err("missing");

        assert!(matches!(error, ArtifactError::NotFound(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("model.json");
        fs::write(&path, TINY_ARTIFACT).expect("write");

        let artifact = ModelArtifact::load(&path).expect("artifact");

        assert_eq!(artifact.features, vec!["Soil_Type", "Nitrogen", "pH"]);
    }

    #[test]
    fn unknown_targets_are_rejected() {
        let raw = TINY_ARTIFACT.replace(r#""N_Status", "Primary"#, r#""Zinc_Status", "Primary"#);

        let error = ModelArtifact::from_json(&raw).expect_err("unknown target");

        assert!(matches!(error, ArtifactError::UnknownTarget(_)));
    }

    #[test]
    fn preprocessor_columns_must_be_features() {
        let raw = TINY_ARTIFACT.replace(r#""name": "pH", "fill""#, r#""name": "Boron", "fill""#);

        let error = ModelArtifact::from_json(&raw).expect_err("unknown column");

        assert!(error.to_string().contains("`Boron`"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let error = ModelArtifact::from_json("{\"features\": [").expect_err("parse");

        assert!(matches!(error, ArtifactError::Parse(_)));
    }
}
