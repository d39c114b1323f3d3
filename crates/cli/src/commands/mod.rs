pub mod config;
pub mod doctor;
pub mod predict;
pub mod price;
pub mod recommend;

use std::fs;
use std::path::Path;

use fertiwise_core::config::{AppConfig, LoadOptions};
use fertiwise_core::pricing::{PriceBook, PriceResolver};
use fertiwise_core::{AdvisoryRuntime, EnsembleClassifier, RecommendationComposer};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INPUT: u8 = 3;
pub const EXIT_ARTIFACT: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Successful result whose output is a command-specific JSON document.
    pub fn document(command: &str, document: &impl Serialize) -> Self {
        match serde_json::to_string_pretty(document) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), 1),
        }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })
}

pub(crate) fn read_input<T: DeserializeOwned>(
    command: &str,
    path: &Path,
) -> Result<T, CommandResult> {
    let raw = fs::read_to_string(path).map_err(|error| {
        CommandResult::failure(
            command,
            "input_unreadable",
            format!("could not read `{}`: {error}", path.display()),
            EXIT_INPUT,
        )
    })?;

    serde_json::from_str(&raw).map_err(|error| {
        CommandResult::failure(
            command,
            "input_invalid",
            format!("could not parse `{}`: {error}", path.display()),
            EXIT_INPUT,
        )
    })
}

pub(crate) fn price_resolver(config: &AppConfig) -> PriceResolver {
    PriceResolver::new(PriceBook::load_or_default(&config.pricing.table_path))
}

pub(crate) fn advisory_runtime(
    command: &str,
    config: &AppConfig,
) -> Result<AdvisoryRuntime, CommandResult> {
    let classifier = EnsembleClassifier::load(&config.model.artifact_path).map_err(|error| {
        CommandResult::failure(command, "model_unavailable", error.to_string(), EXIT_ARTIFACT)
    })?;
    Ok(AdvisoryRuntime::new(classifier, RecommendationComposer::new(price_resolver(config))))
}
