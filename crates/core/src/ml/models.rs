//! Fitted classifiers that can appear in a model artifact.
//!
//! Each classifier consumes the dense input vector produced by the column
//! preprocessor. Classifiers emit one probability per class they were fitted on,
//! which may be fewer classes than the target's label encoder knows about; the
//! ensemble reconciles the shapes before voting.

use serde::{Deserialize, Serialize};

use super::SubModelError;

/// Fitted classifier, tagged by `kind` in the artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// Multinomial logistic regression; a single coefficient row is binary.
    Logistic(LinearModel),
    DecisionTree(Tree),
    RandomForest { trees: Vec<Tree> },
    GradientBoosting(BoostedTrees),
    /// Linear support vector classifier. Only emits hard labels.
    LinearSvc(LinearModel),
}

impl Classifier {
    pub fn predict_proba(&self, inputs: &[f64]) -> Result<Vec<f64>, SubModelError> {
        match self {
            Self::Logistic(model) => {
                let scores = model.decision_function(inputs)?;
                Ok(if scores.len() == 1 {
                    let positive = sigmoid(scores[0]);
                    vec![1.0 - positive, positive]
                } else {
                    softmax(&scores)
                })
            }
            Self::DecisionTree(tree) => tree.class_distribution(inputs),
            Self::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(SubModelError::Malformed("random forest has no trees".to_string()));
                }
                let mut mean: Vec<f64> = Vec::new();
                for tree in trees {
                    let distribution = tree.class_distribution(inputs)?;
                    if mean.len() < distribution.len() {
                        mean.resize(distribution.len(), 0.0);
                    }
                    for (slot, value) in mean.iter_mut().zip(distribution) {
                        *slot += value;
                    }
                }
                let count = trees.len() as f64;
                Ok(mean.into_iter().map(|value| value / count).collect())
            }
            Self::GradientBoosting(model) => model.predict_proba(inputs),
            Self::LinearSvc(_) => Err(SubModelError::ProbabilitiesUnsupported),
        }
    }

    pub fn predict_label(&self, inputs: &[f64]) -> Result<usize, SubModelError> {
        match self {
            Self::LinearSvc(model) => {
                let scores = model.decision_function(inputs)?;
                if scores.len() == 1 {
                    return Ok(usize::from(scores[0] > 0.0));
                }
                first_argmax(&scores)
                    .ok_or_else(|| SubModelError::Malformed("empty decision function".to_string()))
            }
            _ => {
                let probabilities = self.predict_proba(inputs)?;
                first_argmax(&probabilities)
                    .ok_or_else(|| SubModelError::Malformed("empty probability vector".to_string()))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// One row per class (or a single row for binary problems).
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearModel {
    pub fn decision_function(&self, inputs: &[f64]) -> Result<Vec<f64>, SubModelError> {
        if self.coefficients.is_empty() || self.coefficients.len() != self.intercepts.len() {
            return Err(SubModelError::Malformed(format!(
                "{} coefficient rows but {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }

        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                if row.len() != inputs.len() {
                    return Err(SubModelError::InputWidth {
                        expected: row.len(),
                        actual: inputs.len(),
                    });
                }
                Ok(row.iter().zip(inputs).map(|(w, x)| w * x).sum::<f64>() + intercept)
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Inputs with `x[feature] <= threshold` continue at `left`.
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    /// Class counts for classification trees, a single value for regression trees.
    Leaf { value: Vec<f64> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn leaf(&self, inputs: &[f64]) -> Result<&[f64], SubModelError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(value),
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let x = inputs.get(*feature).ok_or(SubModelError::InputWidth {
                        expected: feature + 1,
                        actual: inputs.len(),
                    })?;
                    index = if x <= threshold { *left } else { *right };
                }
                None => {
                    return Err(SubModelError::Malformed(format!("tree node {index} missing")))
                }
            }
        }
        Err(SubModelError::Malformed("tree contains a cycle".to_string()))
    }

    pub fn class_distribution(&self, inputs: &[f64]) -> Result<Vec<f64>, SubModelError> {
        let counts = self.leaf(inputs)?;
        let total: f64 = counts.iter().sum();
        if !(total > 0.0) || counts.iter().any(|count| *count < 0.0) {
            return Err(SubModelError::Malformed("leaf has no class weight".to_string()));
        }
        Ok(counts.iter().map(|count| count / total).collect())
    }

    fn regression_value(&self, inputs: &[f64]) -> Result<f64, SubModelError> {
        self.leaf(inputs)?
            .first()
            .copied()
            .ok_or_else(|| SubModelError::Malformed("regression leaf is empty".to_string()))
    }
}

/// Additive tree ensemble: each round holds one regression tree per class
/// (a single tree for binary problems).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostedTrees {
    pub learning_rate: f64,
    pub base_scores: Vec<f64>,
    pub rounds: Vec<Vec<Tree>>,
}

impl BoostedTrees {
    fn predict_proba(&self, inputs: &[f64]) -> Result<Vec<f64>, SubModelError> {
        if self.base_scores.is_empty() {
            return Err(SubModelError::Malformed("boosted model has no classes".to_string()));
        }

        let mut raw = self.base_scores.clone();
        for round in &self.rounds {
            if round.len() != raw.len() {
                return Err(SubModelError::Malformed(format!(
                    "boosting round has {} trees for {} outputs",
                    round.len(),
                    raw.len()
                )));
            }
            for (score, tree) in raw.iter_mut().zip(round) {
                *score += self.learning_rate * tree.regression_value(inputs)?;
            }
        }

        Ok(if raw.len() == 1 {
            let positive = sigmoid(raw[0]);
            vec![1.0 - positive, positive]
        } else {
            softmax(&raw)
        })
    }
}

fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-500.0, 500.0);
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|value| value / total).collect()
}

/// Index of the largest value; the first occurrence wins ties.
pub fn first_argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.iter().copied().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ if value.is_nan() => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
