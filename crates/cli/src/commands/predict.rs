use std::path::Path;

use fertiwise_core::FeatureVector;
use serde::Deserialize;

use super::{advisory_runtime, load_config, read_input, CommandResult};

const COMMAND: &str = "predict";

/// Accepts `{"features": {...}}` or the bare feature map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictInput {
    Wrapped { features: FeatureVector },
    Bare(FeatureVector),
}

impl PredictInput {
    fn into_features(self) -> FeatureVector {
        match self {
            Self::Wrapped { features } | Self::Bare(features) => features,
        }
    }
}

pub fn run(input: &Path) -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let features = match read_input::<PredictInput>(COMMAND, input) {
        Ok(input) => input.into_features(),
        Err(result) => return result,
    };
    let runtime = match advisory_runtime(COMMAND, &config) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let prediction = runtime.predict(&features);
    tracing::debug!(
        event_name = "cli.predict.completed",
        targets = prediction.labels.len(),
        "prediction completed"
    );
    CommandResult::document(COMMAND, &prediction)
}
