use fertiwise_core::config::{AppConfig, LoadOptions};
use fertiwise_core::pricing::{PriceBook, TableSource};
use fertiwise_core::ModelArtifact;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    fn exit_code(&self) -> u8 {
        let failed = |name: &str| {
            self.checks.iter().any(|check| check.name == name && check.status == CheckStatus::Fail)
        };
        if failed("config_validation") {
            super::EXIT_CONFIG
        } else if failed("model_artifact") {
            super::EXIT_ARTIFACT
        } else {
            0
        }
    }
}

pub fn run(json_output: bool) -> super::CommandResult {
    let report = build_report();
    let exit_code = report.exit_code();

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return super::CommandResult { exit_code, output };
    }

    super::CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_model_artifact(&config));
            checks.push(check_price_table(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["model_artifact", "price_table"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let any_fail = checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Fail | CheckStatus::Skipped));
    let overall_status = if any_fail { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_fail {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_model_artifact(config: &AppConfig) -> DoctorCheck {
    match ModelArtifact::load(&config.model.artifact_path) {
        Ok(artifact) => DoctorCheck {
            name: "model_artifact",
            status: CheckStatus::Pass,
            details: format!(
                "loaded `{}` (version {}, {} targets)",
                config.model.artifact_path.display(),
                artifact.version,
                artifact.targets.len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "model_artifact",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

/// A missing or unusable table is only a warning: pricing falls back to the
/// built-in rates.
fn check_price_table(config: &AppConfig) -> DoctorCheck {
    let path = &config.pricing.table_path;
    if !path.exists() {
        return DoctorCheck {
            name: "price_table",
            status: CheckStatus::Warn,
            details: format!("`{}` not found, built-in rates will be used", path.display()),
        };
    }

    match PriceBook::load(path) {
        Ok(book) if book.is_empty() => DoctorCheck {
            name: "price_table",
            status: CheckStatus::Warn,
            details: format!("`{}` has no usable prices", path.display()),
        },
        Ok(book) => DoctorCheck {
            name: "price_table",
            status: CheckStatus::Pass,
            details: format!(
                "loaded {} prices from {}{}",
                book.len(),
                TableSource::File(path.clone()),
                book.region().map(|region| format!(" for {region}")).unwrap_or_default()
            ),
        },
        Err(error) => DoctorCheck {
            name: "price_table",
            status: CheckStatus::Warn,
            details: format!("{error}; built-in rates will be used"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
