//! Inference and report composition behind a single runtime, shared by the
//! CLI and the HTTP surface.

use crate::domain::feature::{FeatureVector, MODEL_FEATURES};
use crate::domain::prediction::Prediction;
use crate::domain::report::{FieldInputs, RecommendationReport};
use crate::errors::ApplicationError;
use crate::ml::EnsembleClassifier;
use crate::recommend::{RecommendationComposer, ReportOptions};

pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Prediction;
}

impl Predictor for EnsembleClassifier {
    fn predict(&self, features: &FeatureVector) -> Prediction {
        EnsembleClassifier::predict(self, features)
    }
}

#[derive(Clone, Debug)]
pub struct AdvisoryRuntime<P = EnsembleClassifier> {
    predictor: P,
    composer: RecommendationComposer,
}

impl<P> AdvisoryRuntime<P>
where
    P: Predictor,
{
    pub fn new(predictor: P, composer: RecommendationComposer) -> Self {
        Self { predictor, composer }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub fn composer(&self) -> &RecommendationComposer {
        &self.composer
    }

    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let mut features = features.clone();
        features.map_legacy_codes();
        self.predictor.predict(&features)
    }

    /// Validates the request, predicts and composes the report.
    pub fn recommend(
        &self,
        inputs: &FieldInputs,
        options: ReportOptions<'_>,
    ) -> Result<RecommendationReport, ApplicationError> {
        let missing = inputs.features.missing(&MODEL_FEATURES);
        if !missing.is_empty() {
            return Err(ApplicationError::InvalidInput(format!(
                "missing inputs: {}",
                missing.join(", ")
            )));
        }

        let mut inputs = inputs.clone();
        inputs.features.map_legacy_codes();
        let prediction = self.predictor.predict(&inputs.features);
        Ok(self.composer.compose(&inputs, &prediction, options))
    }
}

#[cfg(test)]
mod tests {
    use super::{AdvisoryRuntime, Predictor};
    use crate::domain::feature::{FeatureValue, FeatureVector};
    use crate::domain::prediction::Prediction;
    use crate::domain::report::FieldInputs;
    use crate::domain::target::Target;
    use crate::errors::ApplicationError;
    use crate::pricing::{PriceBook, PriceResolver};
    use crate::recommend::{RecommendationComposer, ReportOptions};

    struct EchoSoil;

    impl Predictor for EchoSoil {
        fn predict(&self, features: &FeatureVector) -> Prediction {
            let soil = features.get("Soil_Type").and_then(FeatureValue::as_category).unwrap_or_default();
            Prediction::new()
                .with(Target::PrimaryFertilizer, "Urea", 0.9)
                .with(Target::Organic1, if soil == "Loamy" { "Vermicompost" } else { "Compost" }, 0.4)
        }
    }

    fn runtime() -> AdvisoryRuntime<EchoSoil> {
        AdvisoryRuntime::new(
            EchoSoil,
            RecommendationComposer::new(PriceResolver::new(PriceBook::builtin())),
        )
    }

    fn complete_features() -> FeatureVector {
        FeatureVector::new()
            .with("Temperature", 27.0)
            .with("Humidity", 60.0)
            .with("Moisture", 40.0)
            .with("Soil_Type", "2")
            .with("Crop", "Maize")
            .with("Nitrogen", 30.0)
            .with("Phosphorus", 18.0)
            .with("Potassium", 95.0)
            .with("pH", 6.4)
    }

    #[test]
    fn missing_features_are_rejected() {
        let inputs = FieldInputs {
            features: FeatureVector::new().with("Temperature", 27.0),
            ..FieldInputs::default()
        };

        let error = runtime().recommend(&inputs, ReportOptions::default()).expect_err("invalid");

        match error {
            ApplicationError::InvalidInput(message) => {
                assert!(message.starts_with("missing inputs: Humidity, Moisture"));
                assert!(message.ends_with("pH"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn legacy_codes_are_mapped_before_prediction() {
        let inputs = FieldInputs { features: complete_features(), ..FieldInputs::default() };

        let report = runtime().recommend(&inputs, ReportOptions::default()).expect("report");

        assert_eq!(report.organic_alternatives[0].name, "Vermicompost");
        assert_eq!(runtime().predict(&complete_features()).label(Target::Organic1), Some("Vermicompost"));
    }
}
