pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::recommend::{RecommendArgs, ReportFormat};

#[derive(Debug, Parser)]
#[command(
    name = "fertiwise",
    about = "Fertiwise fertilizer advisory CLI",
    long_about = "Run ensemble predictions, compose priced fertilizer recommendations, and inspect runtime readiness.",
    after_help = "Examples:\n  fertiwise recommend --input field.json --format text\n  fertiwise price \"muriate of potash\"\n  fertiwise doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Predict every target for a JSON feature vector")]
    Predict {
        #[arg(long, help = "Path to a JSON file holding the feature map")]
        input: PathBuf,
    },
    #[command(about = "Compose a full recommendation report for a JSON field request")]
    Recommend {
        #[arg(long, help = "Path to a JSON file holding features and field details")]
        input: PathBuf,
        #[arg(long, help = "Region passed to price lookups")]
        region: Option<String>,
        #[arg(long, help = "Currency symbol used in formatted costs")]
        currency: Option<String>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,
    },
    #[command(about = "Resolve the unit price of a material through the pricing waterfall")]
    Price {
        material: String,
        #[arg(long)]
        region: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, model artifact, and price table readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Predict { input } => commands::predict::run(&input),
        Command::Recommend { input, region, currency, format } => {
            commands::recommend::run(RecommendArgs {
                input: &input,
                region: region.as_deref(),
                currency: currency.as_deref(),
                format,
            })
        }
        Command::Price { material, region } => commands::price::run(&material, region.as_deref()),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Diagnostics go to stderr so stdout stays machine-readable.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("FERTIWISE_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
