//! Multi-target ensemble inference.
//!
//! Every target is predicted by a weighted soft vote of its sub-models. A
//! sub-model contributes its probability vector when it can produce one, falls
//! back to a smoothed one-hot vector of its hard label otherwise, and is left
//! out of the vote when both fail. A target nobody could vote on is omitted
//! from the result.

pub mod artifact;
pub mod models;
pub mod preprocess;
pub mod vote;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::feature::FeatureVector;
use crate::domain::prediction::Prediction;
use crate::domain::target::Target;
use artifact::{ArtifactError, ModelArtifact, TargetEnsemble};
use preprocess::FeatureRow;
use vote::{smoothed_one_hot, SoftVote};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SubModelError {
    #[error("feature `{column}` is missing and has no fill value")]
    MissingValue { column: String },
    #[error("expected {expected} model inputs, got {actual}")]
    InputWidth { expected: usize, actual: usize },
    #[error("model does not expose class probabilities")]
    ProbabilitiesUnsupported,
    #[error("model is malformed: {0}")]
    Malformed(String),
}

/// A fitted sub-model taking a feature row aligned to the artifact's features.
pub trait SubModel: Send + Sync {
    fn predict_proba(&self, row: &FeatureRow<'_>) -> Result<Vec<f64>, SubModelError>;

    fn predict_label(&self, row: &FeatureRow<'_>) -> Result<usize, SubModelError>;
}

#[derive(Clone, Debug)]
pub struct EnsembleClassifier {
    artifact: Arc<ModelArtifact>,
}

impl EnsembleClassifier {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact: Arc::new(artifact) }
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        ModelArtifact::load(path).map(Self::new)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Predicts every target the artifact knows. Missing features are treated
    /// as absent values; sub-models that cannot cope simply drop out.
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let columns = &self.artifact.features;
        let row = FeatureRow::new(columns, features.aligned(columns));
        let mut prediction = Prediction::new();

        for target in &self.artifact.targets {
            let Some(ensemble) = self.artifact.ensemble(*target) else {
                continue;
            };
            match vote_target(*target, ensemble, &row) {
                Some((label, confidence)) => {
                    prediction.insert(*target, label, confidence);
                }
                None => warn!(
                    event_name = "inference.target.skipped",
                    target = %target,
                    members = ensemble.members.len(),
                    "no sub-model produced a usable prediction"
                ),
            }
        }

        prediction
    }
}

fn vote_target(
    target: Target,
    ensemble: &TargetEnsemble,
    row: &FeatureRow<'_>,
) -> Option<(String, f64)> {
    let class_count = ensemble.classes.len();
    let mut vote = SoftVote::new(class_count);

    for member in &ensemble.members {
        let probabilities = match member.model.predict_proba(row) {
            Ok(probabilities) if usable(&probabilities) => probabilities,
            first => {
                let reason = first.err().map(|error| error.to_string());
                match member.model.predict_label(row) {
                    Ok(label) => smoothed_one_hot(label, class_count),
                    Err(error) => {
                        debug!(
                            target = %target,
                            member = %member.id,
                            proba_error = reason.as_deref().unwrap_or("unusable probabilities"),
                            label_error = %error,
                            "sub-model excluded from vote"
                        );
                        continue;
                    }
                }
            }
        };
        vote.cast(member.weight, probabilities);
    }

    let outcome = vote.finish()?;
    let label = ensemble.decode(outcome.class_id)?;
    Some((label.to_string(), outcome.confidence))
}

fn usable(probabilities: &[f64]) -> bool {
    !probabilities.is_empty()
        && probabilities.iter().all(|probability| probability.is_finite() && *probability >= 0.0)
}
