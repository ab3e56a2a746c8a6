//! Attribution REST API endpoints.

use crate::rest::{api_error, ApiError, AppState, ErrorResponse};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use campaign_core::types::{
    AttributionModel, AttributionReport, AttributionResult, NewTouchpointEvent, TouchpointEvent,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModelQuery {
    /// LINEAR, TIME_DECAY or POSITION_BASED. Defaults to LINEAR.
    pub model: Option<String>,
}

/// POST /v1/attribution/events — Record a touchpoint.
#[utoipa::path(
    post,
    path = "/v1/attribution/events",
    tag = "Attribution",
    request_body = NewTouchpointEvent,
    responses(
        (status = 201, description = "Touchpoint recorded", body = TouchpointEvent),
        (status = 400, description = "Missing required field", body = ErrorResponse),
        (status = 500, description = "Event store failure", body = ErrorResponse),
    )
)]
pub async fn handle_record_event(
    State(state): State<AppState>,
    Json(input): Json<NewTouchpointEvent>,
) -> Result<(StatusCode, Json<TouchpointEvent>), ApiError> {
    let event = state.attribution.record_event(input).await.map_err(api_error)?;
    metrics::counter!("attribution.api.events_recorded").increment(1);
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /v1/attribution/campaigns/:campaign_id — Attribution under one model.
#[utoipa::path(
    get,
    path = "/v1/attribution/campaigns/{campaign_id}",
    tag = "Attribution",
    params(
        ("campaign_id" = String, Path, description = "Campaign identifier"),
        ModelQuery,
    ),
    responses(
        (status = 200, description = "Attribution result", body = AttributionResult),
        (status = 400, description = "Unsupported model", body = ErrorResponse),
        (status = 500, description = "Event store failure", body = ErrorResponse),
    )
)]
pub async fn handle_calculate(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Query(query): Query<ModelQuery>,
) -> Result<Json<AttributionResult>, ApiError> {
    let model = match query.model.as_deref() {
        Some(identifier) => state.attribution.resolve_model(identifier).map_err(api_error)?,
        None => AttributionModel::Linear,
    };

    let result = state
        .attribution
        .calculate_attribution(&campaign_id, model)
        .await
        .map_err(api_error)?;
    metrics::counter!("attribution.api.calculations", "model" => model.as_str()).increment(1);
    Ok(Json(result))
}

/// GET /v1/attribution/campaigns/:campaign_id/report — All models plus summary.
#[utoipa::path(
    get,
    path = "/v1/attribution/campaigns/{campaign_id}/report",
    tag = "Attribution",
    params(("campaign_id" = String, Path, description = "Campaign identifier")),
    responses(
        (status = 200, description = "Attribution report", body = AttributionReport),
        (status = 500, description = "Event store failure", body = ErrorResponse),
    )
)]
pub async fn handle_report(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<AttributionReport>, ApiError> {
    let report = state
        .attribution
        .get_report(&campaign_id)
        .await
        .map_err(api_error)?;
    metrics::counter!("attribution.api.reports").increment(1);
    Ok(Json(report))
}

/// GET /v1/attribution/campaigns/:campaign_id/events — Ordered touchpoints.
#[utoipa::path(
    get,
    path = "/v1/attribution/campaigns/{campaign_id}/events",
    tag = "Attribution",
    params(("campaign_id" = String, Path, description = "Campaign identifier")),
    responses(
        (status = 200, description = "Touchpoints ordered by occurrence", body = Vec<TouchpointEvent>),
        (status = 500, description = "Event store failure", body = ErrorResponse),
    )
)]
pub async fn handle_list_events(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Vec<TouchpointEvent>>, ApiError> {
    let events = state
        .attribution
        .events(&campaign_id)
        .await
        .map_err(api_error)?;
    Ok(Json(events))
}
