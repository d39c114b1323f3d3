use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::target::Target;

/// Ensemble output for one request: labels and confidences as two parallel
/// maps. A target missing from `labels` means "no prediction".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "predictions")]
    pub labels: BTreeMap<Target, String>,
    pub confidences: BTreeMap<Target, f64>,
}

impl Prediction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, target: Target, label: impl Into<String>, confidence: f64) -> Self {
        self.insert(target, label, confidence);
        self
    }

    /// Label without a confidence, as supplied by callers that only forward
    /// upstream labels.
    pub fn with_label(mut self, target: Target, label: impl Into<String>) -> Self {
        self.labels.insert(target, label.into());
        self
    }

    pub fn insert(&mut self, target: Target, label: impl Into<String>, confidence: f64) {
        self.labels.insert(target, label.into());
        self.confidences.insert(target, confidence);
    }

    /// Non-blank label for a target.
    pub fn label(&self, target: Target) -> Option<&str> {
        self.labels.get(&target).map(|label| label.trim()).filter(|label| !label.is_empty())
    }

    pub fn confidence(&self, target: Target) -> Option<f64> {
        self.confidences.get(&target).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Prediction;
    use crate::domain::target::Target;

    #[test]
    fn blank_labels_read_as_absent() {
        let prediction = Prediction::new().with(Target::Organic1, "  ", 0.4);

        assert_eq!(prediction.label(Target::Organic1), None);
        assert_eq!(prediction.confidence(Target::Organic1), Some(0.4));
    }

    #[test]
    fn serializes_as_parallel_maps() {
        let prediction = Prediction::new().with(Target::PrimaryFertilizer, "Urea", 0.9);
        let json = serde_json::to_value(&prediction).expect("serialize");

        assert_eq!(json["predictions"]["Primary_Fertilizer"], "Urea");
        assert_eq!(json["confidences"]["Primary_Fertilizer"], 0.9);
    }
}
