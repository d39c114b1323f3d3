//! JSON API over the advisory runtime.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use fertiwise_core::domain::report::{FieldInputs, RecommendationReport};
use fertiwise_core::{ApplicationError, FeatureVector, InterfaceError, Prediction, ReportOptions};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::bootstrap::AppState;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub features: FeatureVector,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(flatten)]
    pub inputs: FieldInputs,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: Option<String>,
    pub correlation_id: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/predict", post(predict))
        .route("/api/recommend", post(recommend))
        .with_state(state)
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(request) = payload.map_err(|rejection| reject_body(rejection, &correlation_id))?;

    let runtime = Arc::clone(&state.runtime);
    let prediction = tokio::task::spawn_blocking(move || runtime.predict(&request.features))
        .await
        .map_err(|error| {
            error_response(InterfaceError::Internal {
                message: error.to_string(),
                correlation_id: correlation_id.clone(),
            })
        })?;

    info!(
        event_name = "api.predict.completed",
        correlation_id = %correlation_id,
        targets = prediction.labels.len(),
        "prediction served"
    );
    Ok(Json(prediction))
}

pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendationReport>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(request) = payload.map_err(|rejection| reject_body(rejection, &correlation_id))?;

    let runtime = Arc::clone(&state.runtime);
    let region = request.region.or(state.default_region);
    let currency = request.currency.or(state.default_currency);
    let inputs = request.inputs;
    let outcome = tokio::task::spawn_blocking(move || {
        runtime.recommend(
            &inputs,
            ReportOptions { region: region.as_deref(), currency: currency.as_deref() },
        )
    })
    .await;

    match outcome {
        Ok(Ok(report)) => {
            info!(
                event_name = "api.recommend.completed",
                correlation_id = %correlation_id,
                report_id = %report.meta.report_id,
                "recommendation served"
            );
            Ok(Json(report))
        }
        Ok(Err(error)) => Err(error_response(error.into_interface(correlation_id))),
        Err(error) => Err(error_response(InterfaceError::Internal {
            message: error.to_string(),
            correlation_id,
        })),
    }
}

fn reject_body(rejection: JsonRejection, correlation_id: &str) -> ApiError {
    let error = ApplicationError::InvalidInput(rejection.body_text());
    error_response(error.into_interface(correlation_id))
}

fn error_response(error: InterfaceError) -> ApiError {
    let (status, detail) = match &error {
        InterfaceError::BadRequest { message, .. } => {
            (StatusCode::BAD_REQUEST, Some(message.clone()))
        }
        InterfaceError::ServiceUnavailable { message, .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, Some(message.clone()))
        }
        InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };

    warn!(
        event_name = "api.request.failed",
        correlation_id = %error.correlation_id(),
        status = status.as_u16(),
        error = %error,
        "request failed"
    );

    let body = ErrorBody {
        error: error.user_message().to_string(),
        detail,
        correlation_id: error.correlation_id().to_string(),
    };
    (status, Json(body))
}
