pub mod advisor;
pub mod config;
pub mod domain;
pub mod dosage;
pub mod errors;
pub mod ml;
pub mod pricing;
pub mod recommend;

pub use advisor::{AdvisoryRuntime, Predictor};
pub use domain::feature::{FeatureValue, FeatureVector, MODEL_FEATURES};
pub use domain::prediction::Prediction;
pub use domain::report::{FieldInputs, RecommendationReport};
pub use domain::target::Target;
pub use errors::{ApplicationError, InterfaceError};
pub use ml::artifact::{ArtifactError, ModelArtifact};
pub use ml::EnsembleClassifier;
pub use pricing::{DeadlineProvider, PriceBook, PriceProvider, PriceResolver, PriceSource};
pub use recommend::{RecommendationComposer, ReportOptions};
