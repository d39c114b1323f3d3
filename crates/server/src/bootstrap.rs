use std::sync::Arc;

use fertiwise_core::config::{AppConfig, ConfigError};
use fertiwise_core::ml::artifact::ArtifactError;
use fertiwise_core::pricing::{PriceBook, PriceResolver};
use fertiwise_core::{AdvisoryRuntime, EnsembleClassifier, RecommendationComposer};
use thiserror::Error;
use tracing::info;

/// Shared, read-only request state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub runtime: Arc<AdvisoryRuntime>,
    pub default_region: Option<String>,
    pub default_currency: Option<String>,
}

impl AppState {
    pub fn artifact_version(&self) -> &str {
        &self.runtime.predictor().artifact().version
    }
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("model artifact could not be loaded: {0}")]
    Artifact(#[source] ArtifactError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let classifier =
        EnsembleClassifier::load(&config.model.artifact_path).map_err(BootstrapError::Artifact)?;
    info!(
        event_name = "system.bootstrap.artifact_loaded",
        correlation_id = "bootstrap",
        path = %config.model.artifact_path.display(),
        version = %classifier.artifact().version,
        targets = classifier.artifact().targets.len(),
        "model artifact loaded"
    );

    let book = PriceBook::load_or_default(&config.pricing.table_path);
    info!(
        event_name = "system.bootstrap.price_table_loaded",
        correlation_id = "bootstrap",
        source = %book.source(),
        entries = book.len(),
        "price table loaded"
    );

    let composer = RecommendationComposer::new(PriceResolver::new(book));
    let runtime = AdvisoryRuntime::new(classifier, composer);
    let state = AppState {
        runtime: Arc::new(runtime),
        default_region: config.pricing.region.clone(),
        default_currency: config.pricing.currency.clone(),
    };

    Ok(Application { config, state })
}
