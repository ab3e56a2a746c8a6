//! Shared REST state, error mapping, and operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use campaign_core::error::CampaignError;
use campaign_reporting::AttributionService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub attribution: Arc<AttributionService>,
    pub node_id: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(attribution: Arc<AttributionService>, node_id: impl Into<String>) -> Self {
        Self {
            attribution,
            node_id: node_id.into(),
            start_time: Instant::now(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a service error onto an HTTP status and JSON body. Backend failures
/// are logged and their details withheld from the caller.
pub fn api_error(e: CampaignError) -> ApiError {
    match e {
        CampaignError::Validation(msg) => {
            warn!(error = %msg, "Request validation failed");
            metrics::counter!("api.validation_errors").increment(1);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "invalid_request".to_string(),
                    message: msg,
                }),
            )
        }
        CampaignError::UnsupportedModel(model) => {
            warn!(model = %model, "Unsupported attribution model requested");
            metrics::counter!("api.validation_errors").increment(1);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "unsupported_model".to_string(),
                    message: format!(
                        "unknown attribution model '{model}', expected LINEAR, TIME_DECAY or POSITION_BASED"
                    ),
                }),
            )
        }
        other => {
            error!(error = %other, "Attribution request failed");
            metrics::counter!("api.errors").increment(1);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "attribution_failed".to_string(),
                    message: "Internal processing error".to_string(),
                }),
            )
        }
    }
}

/// GET /health — Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses((status = 200, description = "Ready to accept traffic"))
)]
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}
