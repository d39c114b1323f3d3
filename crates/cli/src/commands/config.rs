use std::env;
use std::fs;
use std::path::Path;

use fertiwise_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

struct Field<'a> {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let doc = config_file_doc.as_ref();
    let path = config_file_path.as_deref();

    let fields = [
        Field {
            key_path: "model.artifact_path",
            env_keys: &["FERTIWISE_MODEL_ARTIFACT_PATH"],
            value: config.model.artifact_path.display().to_string(),
            doc,
            path,
        },
        Field {
            key_path: "pricing.table_path",
            env_keys: &["FERTIWISE_PRICING_TABLE_PATH"],
            value: config.pricing.table_path.display().to_string(),
            doc,
            path,
        },
        Field {
            key_path: "pricing.region",
            env_keys: &["FERTIWISE_PRICING_REGION"],
            value: config.pricing.region.clone().unwrap_or_else(|| "<unset>".to_string()),
            doc,
            path,
        },
        Field {
            key_path: "pricing.currency",
            env_keys: &["FERTIWISE_PRICING_CURRENCY"],
            value: config
                .pricing
                .currency
                .clone()
                .unwrap_or_else(|| "<from price table>".to_string()),
            doc,
            path,
        },
        Field {
            key_path: "pricing.provider_timeout_ms",
            env_keys: &["FERTIWISE_PRICING_PROVIDER_TIMEOUT_MS"],
            value: config.pricing.provider_timeout_ms.to_string(),
            doc,
            path,
        },
        Field {
            key_path: "server.bind_address",
            env_keys: &["FERTIWISE_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
            doc,
            path,
        },
        Field {
            key_path: "server.port",
            env_keys: &["FERTIWISE_SERVER_PORT"],
            value: config.server.port.to_string(),
            doc,
            path,
        },
        Field {
            key_path: "server.graceful_shutdown_secs",
            env_keys: &["FERTIWISE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            value: config.server.graceful_shutdown_secs.to_string(),
            doc,
            path,
        },
        Field {
            key_path: "logging.level",
            env_keys: &["FERTIWISE_LOGGING_LEVEL", "FERTIWISE_LOG_LEVEL"],
            value: config.logging.level.clone(),
            doc,
            path,
        },
        Field {
            key_path: "logging.format",
            env_keys: &["FERTIWISE_LOGGING_FORMAT", "FERTIWISE_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format).to_lowercase(),
            doc,
            path,
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(
        fields.iter().map(|field| render_line(field.key_path, &field.value, field_source(field))),
    );
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(field: &Field<'_>) -> String {
    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = field.doc {
        if contains_path(doc, field.key_path) {
            let file_path = field
                .path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
