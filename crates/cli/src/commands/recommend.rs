use std::path::Path;

use clap::ValueEnum;
use fertiwise_core::domain::report::{FieldInputs, RecommendationReport};
use fertiwise_core::{ApplicationError, ReportOptions};
use serde::Deserialize;
use tera::{Context, Tera};

use super::{advisory_runtime, load_config, read_input, CommandResult, EXIT_INPUT};

const COMMAND: &str = "recommend";
const TEXT_TEMPLATE: &str = "report.txt";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

/// Request file: the field inputs plus optional presentation hints.
#[derive(Debug, Deserialize)]
struct RecommendInput {
    #[serde(flatten)]
    inputs: FieldInputs,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    currency: Option<String>,
}

pub struct RecommendArgs<'a> {
    pub input: &'a Path,
    pub region: Option<&'a str>,
    pub currency: Option<&'a str>,
    pub format: ReportFormat,
}

pub fn run(args: RecommendArgs<'_>) -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let request = match read_input::<RecommendInput>(COMMAND, args.input) {
        Ok(request) => request,
        Err(result) => return result,
    };
    let runtime = match advisory_runtime(COMMAND, &config) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    // Flags win over the request file, which wins over configuration.
    let region = args.region.or(request.region.as_deref()).or(config.pricing.region.as_deref());
    let currency =
        args.currency.or(request.currency.as_deref()).or(config.pricing.currency.as_deref());

    let report = match runtime.recommend(&request.inputs, ReportOptions { region, currency }) {
        Ok(report) => report,
        Err(ApplicationError::InvalidInput(message)) => {
            return CommandResult::failure(COMMAND, "input_invalid", message, EXIT_INPUT)
        }
        Err(error) => return CommandResult::failure(COMMAND, "recommendation", error.to_string(), 1),
    };

    match args.format {
        ReportFormat::Json => CommandResult::document(COMMAND, &report),
        ReportFormat::Text => match render_text(&report) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(COMMAND, "render", error.to_string(), 1),
        },
    }
}

pub fn render_text(report: &RecommendationReport) -> Result<String, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEXT_TEMPLATE, include_str!("../../templates/report.txt"))?;

    let mut context = Context::new();
    context.insert("report", report);
    context.insert("report_id", &report.meta.report_id.to_string());
    let rendered = tera.render(TEXT_TEMPLATE, &context)?;
    Ok(rendered.trim_end().to_string())
}
