use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use fertiwise_core::pricing::TableSource;
use serde::Serialize;

use crate::bootstrap::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub artifact_version: String,
    pub price_table_source: String,
    pub model: HealthCheck,
    pub price_table: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// The state only exists once the artifact loaded, so the service is ready
/// whenever this handler runs. Built-in price rates are reported, not fatal.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let artifact = state.runtime.predictor().artifact();
    let book = state.runtime.composer().prices().book();

    let price_table = match book.source() {
        TableSource::File(path) => HealthCheck {
            status: "ready",
            detail: format!("{} prices loaded from {}", book.len(), path.display()),
        },
        TableSource::BuiltIn => HealthCheck {
            status: "fallback",
            detail: "price file unavailable, serving built-in rates".to_string(),
        },
    };

    let payload = HealthResponse {
        status: "ready",
        artifact_version: state.artifact_version().to_string(),
        price_table_source: book.source().to_string(),
        model: HealthCheck {
            status: "ready",
            detail: format!(
                "{} targets over {} features",
                artifact.targets.len(),
                artifact.features.len()
            ),
        },
        price_table,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::bootstrap::bootstrap_with_config;
    use crate::bootstrap::test_support::demo_config;
    use crate::health::router;

    async fn get_health(config: fertiwise_core::config::AppConfig) -> (StatusCode, Value) {
        let app = bootstrap_with_config(config).expect("bootstrap should succeed");
        let response = router(app.state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("health response");

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[tokio::test]
    async fn health_reports_artifact_version_and_price_table() {
        let (status, payload) = get_health(demo_config()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["status"], "ready");
        assert_eq!(payload["artifact_version"], "demo-2024.1");
        assert!(payload["price_table_source"].as_str().unwrap_or_default().starts_with("file:"));
        assert_eq!(payload["price_table"]["status"], "ready");
        assert_eq!(payload["model"]["detail"], "8 targets over 9 features");
    }

    #[tokio::test]
    async fn health_flags_builtin_price_rates() {
        let mut config = demo_config();
        config.pricing.table_path = "data/absent.json".into();

        let (status, payload) = get_health(config).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["price_table_source"], "built-in");
        assert_eq!(payload["price_table"]["status"], "fallback");
    }
}
